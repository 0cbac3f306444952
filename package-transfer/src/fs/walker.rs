//! Package discovery and directory listing.
//!
//! Packages are the direct subdirectories of the source root. Their entries
//! are compared by name only, so listings return plain file names.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A package folder found under the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Full path to the package folder
    pub path: PathBuf,

    /// Folder basename, kept when the package is archived or moved
    pub name: String,
}

impl Package {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = entry_name(&path);
        Self { path, name }
    }
}

/// Discover every package folder directly under `root`, sorted by name.
///
/// Plain files in the source root are ignored. Symlinks that resolve to a
/// directory count as packages.
///
/// # Example
/// ```no_run
/// use package_transfer::fs::walker::discover_packages;
/// use std::path::Path;
///
/// let packages = discover_packages(Path::new("/data/incoming")).unwrap();
/// println!("Found {} packages", packages.len());
/// ```
pub fn discover_packages(root: &Path) -> std::io::Result<Vec<Package>> {
    let mut packages = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry?;
        if entry.path().is_dir() {
            packages.push(Package::from_path(entry.path()));
        }
    }

    Ok(packages)
}

/// List the names of all entries (files and subfolders) directly inside `dir`.
pub fn list_entries(dir: &Path) -> std::io::Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }

    Ok(names)
}

/// Basename of a path as an owned string, falling back to the full path.
pub fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
