//! Batch executor - runs every package in the source root through
//! validation, optional backup and the move to the destination.
//!
//! Packages are processed one at a time in name order. A failure at any
//! stage ends that package's run only: it is reported (console, log, error
//! record, email) and the executor carries on with the next package.

pub mod manifest;
pub mod validate;

use crate::config::TransferConfig;
use crate::fs::walker::{discover_packages, Package};
use crate::notify::{Notifier, SmtpNotifier};
use crate::transfer::{archive_package, move_package};
use crate::utils::error_log::ErrorLog;
use crate::utils::errors::{error_chain, error_summary, Result, TransferError};
use chrono::Local;
use manifest::ManifestReader;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use validate::PackageValidator;

/// Terminal state of a package after one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    /// Moved to the destination root (and archived, if configured)
    Transferred,
    /// Failed validation; left in the source root
    Rejected,
    /// Archive copy failed; left in the source root
    BackupFailed,
    /// Move failed; left in the source root
    MoveFailed,
}

#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub name: String,
    pub path: PathBuf,
    pub state: PackageState,
    /// One-line error summary for failed packages
    pub error: Option<String>,
}

/// Outcomes of a whole run, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<PackageOutcome>,
}

impl BatchReport {
    pub fn transferred(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == PackageState::Transferred)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.transferred()
    }

    pub fn outcome(&self, name: &str) -> Option<&PackageOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Runs one batch over the configured source root
pub struct BatchExecutor<'a> {
    config: &'a TransferConfig,
    validator: PackageValidator,
    error_log: ErrorLog,
    notifier: Option<Box<dyn Notifier>>,
}

impl<'a> BatchExecutor<'a> {
    /// Executor with an SMTP notifier when email is configured
    pub fn new(config: &'a TransferConfig) -> Self {
        let notifier = config
            .email
            .clone()
            .map(|email| Box::new(SmtpNotifier::new(email)) as Box<dyn Notifier>);

        Self {
            config,
            validator: PackageValidator::new(ManifestReader::new(config.manifest.fallback_encoding)),
            error_log: ErrorLog::new(&config.log.error_file),
            notifier,
        }
    }

    /// Replace the notification channel
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Process every package in the source root.
    ///
    /// Only a failure to scan the source root is returned as an error;
    /// per-package failures end up in the report.
    pub fn run(&self) -> Result<BatchReport> {
        let packages = discover_packages(&self.config.source)?;
        let mut report = BatchReport::default();

        if packages.is_empty() {
            debug!("Found 0 packages");
            return Ok(report);
        }
        debug!("Found {} packages", packages.len());

        for package in &packages {
            report.outcomes.push(self.process(package));
        }

        info!(
            transferred = report.transferred(),
            failed = report.failed(),
            "Batch complete"
        );
        Ok(report)
    }

    /// Run a single package through all stages and report any failure.
    pub fn process(&self, package: &Package) -> PackageOutcome {
        info!(package = %package.name, path = %package.path.display(), "Processing package");

        match self.transfer(package) {
            Ok(destination) => {
                info!(
                    package = %package.name,
                    destination = %destination.display(),
                    "Package transferred"
                );
                PackageOutcome {
                    name: package.name.clone(),
                    path: package.path.clone(),
                    state: PackageState::Transferred,
                    error: None,
                }
            }
            Err((state, err)) => {
                self.report_failure(package, &err);
                PackageOutcome {
                    name: package.name.clone(),
                    path: package.path.clone(),
                    state,
                    error: Some(error_summary(&err)),
                }
            }
        }
    }

    fn transfer(&self, package: &Package) -> std::result::Result<PathBuf, (PackageState, TransferError)> {
        let validation = self
            .validator
            .validate(&package.path)
            .map_err(|e| (PackageState::Rejected, e))?;
        debug!(
            package = %package.name,
            descriptor = %validation.descriptor,
            entries = validation.entries,
            "Package passed validation"
        );

        if let Some(backup_root) = &self.config.backup {
            debug!(package = %package.name, "Backing up package");
            let today = Local::now().date_naive();
            archive_package(package, backup_root, today)
                .map_err(|e| (PackageState::BackupFailed, e))?;
        }

        debug!(package = %package.name, "Moving package");
        move_package(package, &self.config.destination).map_err(|e| (PackageState::MoveFailed, e))
    }

    fn report_failure(&self, package: &Package, err: &TransferError) {
        let detail = error_chain(err);

        eprintln!("Error on package {}: {}", package.name, error_summary(err));
        error!(
            package = %package.name,
            path = %package.path.display(),
            kind = err.kind(),
            "{}",
            detail
        );

        let record = format!(
            "Error on package {} [{}]\n{}",
            package.path.display(),
            err.kind(),
            detail
        );
        if let Err(e) = self.error_log.append(&record) {
            error!(
                path = %self.error_log.path().display(),
                "Failed to write error record: {}",
                e
            );
        }

        if let Some(notifier) = &self.notifier {
            let subject = format!("Package {} failed", package.name);
            if let Err(e) = notifier.notify(&subject, &record) {
                warn!(package = %package.name, kind = e.kind(), "{}", e);
                if let Err(write_err) = self.error_log.append(&error_chain(&e)) {
                    error!(
                        path = %self.error_log.path().display(),
                        "Failed to write error record: {}",
                        write_err
                    );
                }
            }
        }
    }
}
