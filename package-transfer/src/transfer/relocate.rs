//! Moving validated packages into the destination root.

use crate::fs::copy::copy_tree;
use crate::fs::walker::Package;
use crate::utils::errors::{Result, TransferError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Move `package` to `<destination_root>/<package name>`.
///
/// An existing entry at the target is never merged into or replaced. A rename
/// is tried first. Only when the roots are on different file systems is the
/// folder copied and the source removed once the copy is complete; any other
/// rename error leaves the package where it is.
pub fn move_package(package: &Package, destination_root: &Path) -> Result<PathBuf> {
    let destination = destination_root.join(&package.name);

    if fs::symlink_metadata(&destination).is_ok() {
        return Err(TransferError::DestinationCollision {
            package: package.name.clone(),
            destination,
        });
    }

    let moved = match fs::rename(&package.path, &destination) {
        Ok(()) => Ok(()),
        Err(rename_err) if needs_copy_fallback(&rename_err) => {
            warn!(
                package = %package.name,
                "Rename crosses file systems ({}), falling back to copy and delete",
                rename_err
            );
            copy_then_remove(&package.path, &destination)
        }
        Err(rename_err) => Err(rename_err),
    };

    moved.map_err(|source| TransferError::Move {
        package: package.name.clone(),
        source,
    })?;

    Ok(destination)
}

/// Only a cross-device rename is retried as copy and delete.
fn needs_copy_fallback(err: &std::io::Error) -> bool {
    err.kind() == std::io::ErrorKind::CrossesDevices
}

fn copy_then_remove(source: &Path, destination: &Path) -> std::io::Result<()> {
    if let Err(e) = copy_tree(source, destination) {
        // Leave no half-copied package behind; the source is still complete.
        let _ = fs::remove_dir_all(destination);
        return Err(e);
    }
    fs::remove_dir_all(source)
}
