//! Error types for the package transfer pipeline.

use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a descriptor file could not be turned into a declared file list.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot read descriptor {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("descriptor {} is neither UTF-8 nor {fallback}", .path.display())]
    Decode { path: PathBuf, fallback: &'static str },

    #[error("descriptor is not a valid INI document: {0}")]
    Parse(String),

    #[error("descriptor has no [{0}] section")]
    MissingSection(&'static str),
}

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("expected exactly one descriptor file in package {package}, found {found}")]
    ManifestCount { package: String, found: usize },

    #[error("cannot read the file list of package {package}")]
    ManifestContent {
        package: String,
        #[source]
        source: ManifestError,
    },

    #[error("descriptor of package {package} declares no files")]
    EmptyManifest { package: String },

    #[error(
        "package {package} does not match its descriptor (missing: [{}], unexpected: [{}])",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    Integrity {
        package: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("failed to back up package {package}")]
    Backup {
        package: String,
        #[source]
        source: std::io::Error,
    },

    #[error("destination {} already exists for package {package}", .destination.display())]
    DestinationCollision { package: String, destination: PathBuf },

    #[error("failed to move package {package}")]
    Move {
        package: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    /// Taxonomy name used in log lines and the error record.
    pub fn kind(&self) -> &'static str {
        match self {
            TransferError::Config(_) => "ConfigError",
            TransferError::ManifestCount { .. } => "ManifestCountError",
            TransferError::ManifestContent { .. } | TransferError::EmptyManifest { .. } => {
                "ManifestContentError"
            }
            TransferError::Integrity { .. } => "IntegrityError",
            TransferError::Backup { .. } => "BackupFailure",
            TransferError::DestinationCollision { .. } => "DestinationCollision",
            TransferError::Move { .. } => "MoveFailure",
            TransferError::Notification(_) => "NotificationFailure",
            TransferError::Io(_) => "IoError",
        }
    }
}

/// Renders an error followed by every `source()` in its chain.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        rendered.push_str("\n  caused by: ");
        rendered.push_str(&inner.to_string());
        cause = inner.source();
    }
    rendered
}

/// Single-line variant of [`error_chain`] for console output.
pub fn error_summary(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        rendered.push_str(": ");
        rendered.push_str(&inner.to_string());
        cause = inner.source();
    }
    rendered
}

pub type Result<T> = std::result::Result<T, TransferError>;
