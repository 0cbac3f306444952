//! File metadata carried over when copying package contents.
//!
//! Archive copies keep the original timestamps and permission bits so a
//! restored package looks like the one that arrived.

use filetime::FileTime;
use std::fs;
use std::path::Path;

/// Timestamps and permissions of a file or directory
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// Last access time
    pub accessed: FileTime,

    /// Last modification time
    pub modified: FileTime,

    /// Permission bits (read-only flag on non-Unix platforms)
    pub permissions: fs::Permissions,
}

impl FileMetadata {
    /// Extract metadata from a path, following symlinks
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = fs::metadata(path)?;

        Ok(Self {
            accessed: FileTime::from_last_access_time(&metadata),
            modified: FileTime::from_last_modification_time(&metadata),
            permissions: metadata.permissions(),
        })
    }

    /// Apply this metadata to a path.
    ///
    /// Times are set before permissions so read-only targets still get them.
    pub fn apply_to_path(&self, path: &Path) -> std::io::Result<()> {
        filetime::set_file_times(path, self.accessed, self.modified)?;
        fs::set_permissions(path, self.permissions.clone())?;
        Ok(())
    }
}
