//! File system helpers: package discovery, recursive copy, metadata.

pub mod copy;
pub mod metadata;
pub mod walker;

pub use copy::{copy_tree, CopyStats};
pub use walker::{discover_packages, list_entries, Package};
