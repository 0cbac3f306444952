//! Per-package transfer steps: dated archive copy and relocation.

pub mod archive;
pub mod relocate;

pub use archive::{archive_package, backup_destination};
pub use relocate::move_package;
