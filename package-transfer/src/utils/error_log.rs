//! Persistent error record.
//!
//! Every reported failure is appended to a plain text file under a timestamp
//! header, independently of the debug log and its level filter.

use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp format shared by the error record and the file log.
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

#[derive(Debug, Clone)]
pub struct ErrorLog {
    path: PathBuf,
}

impl ErrorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `message` under a `***<timestamp>***` header line.
    pub fn append(&self, message: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let now = Local::now().format(TIMESTAMP_FORMAT);
        write!(file, "***{}***\n{}\n", now, message)?;
        Ok(())
    }
}
