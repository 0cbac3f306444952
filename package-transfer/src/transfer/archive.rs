//! Dated archive copies of packages.
//!
//! Before a package leaves the source root it can be copied to
//! `<backup root>/<YYYY-MM-DD>/<package>`. Each run date gets its own folder,
//! so older archives are never touched.

use crate::fs::copy::{copy_tree, CopyStats};
use crate::fs::walker::{list_entries, Package};
use crate::utils::errors::{Result, TransferError};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Where the archive copy of `package_name` goes for `date`.
pub fn backup_destination(backup_root: &Path, date: NaiveDate, package_name: &str) -> PathBuf {
    backup_root
        .join(date.format(DATE_FORMAT).to_string())
        .join(package_name)
}

/// Copy every entry of `package` into its dated archive folder.
///
/// The source is only read. If the archive folder already exists the copy
/// goes into it.
pub fn archive_package(package: &Package, backup_root: &Path, date: NaiveDate) -> Result<PathBuf> {
    let destination = backup_destination(backup_root, date, &package.name);

    let stats = copy_entries(&package.path, &destination).map_err(|source| TransferError::Backup {
        package: package.name.clone(),
        source,
    })?;

    debug!(
        package = %package.name,
        destination = %destination.display(),
        files = stats.files,
        bytes = stats.bytes,
        "Backup written"
    );

    Ok(destination)
}

fn copy_entries(source: &Path, destination: &Path) -> std::io::Result<CopyStats> {
    std::fs::create_dir_all(destination)?;

    let mut stats = CopyStats::default();
    for name in list_entries(source)? {
        debug!("Backing up entry {}", name);
        stats += copy_tree(&source.join(&name), &destination.join(&name))?;
    }

    Ok(stats)
}
