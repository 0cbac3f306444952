//! Package Transfer Library
//!
//! Validates self-describing package folders against their descriptors and
//! moves the valid ones from a source root to a destination root, optionally
//! keeping a dated archive copy.

pub mod config;
pub mod executor;
pub mod fs;
pub mod notify;
pub mod transfer;
pub mod utils;

// Re-export commonly used types
pub use config::TransferConfig;
pub use executor::{BatchExecutor, BatchReport, PackageOutcome, PackageState};
pub use utils::errors::{ManifestError, TransferError};
pub type Result<T> = std::result::Result<T, TransferError>;
