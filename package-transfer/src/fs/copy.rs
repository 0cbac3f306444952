//! Recursive copy with metadata preservation.

use crate::fs::metadata::FileMetadata;
use std::fs;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Totals for a finished copy
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub dirs: usize,
    pub bytes: u64,
}

impl AddAssign for CopyStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.dirs += other.dirs;
        self.bytes += other.bytes;
    }
}

/// Copy `src` (a file or a whole directory tree) to `dst`.
///
/// Symlinks are followed and their targets copied as regular content.
/// Existing directories at the destination are reused; existing files are
/// overwritten. Directory metadata is applied after their contents so the
/// copied timestamps survive.
pub fn copy_tree(src: &Path, dst: &Path) -> std::io::Result<CopyStats> {
    let mut stats = CopyStats::default();
    let mut dirs: Vec<(PathBuf, PathBuf)> = Vec::new();

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(std::io::Error::other)?;
        let target = if relative.as_os_str().is_empty() {
            dst.to_path_buf()
        } else {
            dst.join(relative)
        };

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
            dirs.push((entry.path().to_path_buf(), target));
            stats.dirs += 1;
        } else {
            stats.bytes += fs::copy(entry.path(), &target)?;
            FileMetadata::from_path(entry.path())?.apply_to_path(&target)?;
            stats.files += 1;
        }
    }

    // Deepest first, so setting a parent's times is not undone by a child.
    for (source, target) in dirs.iter().rev() {
        FileMetadata::from_path(source)?.apply_to_path(target)?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use tempfile::TempDir;

    #[test]
    fn test_copy_single_file() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("a.txt");
        let dst = temp_dir.path().join("b.txt");
        fs::write(&src, b"12345")?;

        let stats = copy_tree(&src, &dst)?;

        assert_eq!(stats, CopyStats { files: 1, dirs: 0, bytes: 5 });
        assert_eq!(fs::read(&dst)?, b"12345");
        Ok(())
    }

    #[test]
    fn test_copy_nested_tree() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(src.join("scans/raw"))?;
        fs::write(src.join("scans/page1.tif"), b"page")?;
        fs::write(src.join("scans/raw/page1.raw"), b"raw")?;

        let stats = copy_tree(&src, &dst)?;

        assert_eq!(stats.files, 2);
        assert_eq!(stats.dirs, 3);
        assert_eq!(fs::read(dst.join("scans/raw/page1.raw"))?, b"raw");
        assert!(src.join("scans/page1.tif").exists());
        Ok(())
    }

    #[test]
    fn test_copy_keeps_file_times() -> std::io::Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir(&src)?;
        fs::write(src.join("old.txt"), b"old")?;

        let stamp = FileTime::from_unix_time(1_500_000_000, 0);
        filetime::set_file_times(src.join("old.txt"), stamp, stamp)?;

        copy_tree(&src, &dst)?;

        let copied = fs::metadata(dst.join("old.txt"))?;
        assert_eq!(FileTime::from_last_modification_time(&copied), stamp);
        Ok(())
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = copy_tree(&temp_dir.path().join("missing"), &temp_dir.path().join("dst"));
        assert!(result.is_err());
    }
}
