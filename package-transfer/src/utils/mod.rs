//! Utility modules for package transfer.

pub mod error_log;
pub mod errors;
pub mod logger;

pub use error_log::ErrorLog;
pub use errors::{ManifestError, Result, TransferError};
