//! Package Transfer - Main entry point
//!
//! Runs one batch over the configured source root and exits.

use anyhow::Result;
use clap::Parser;
use package_transfer::config::{EmailConfig, DEFAULT_CONFIG_FILE, DEFAULT_ERROR_FILE};
use package_transfer::notify::{Notifier, SmtpNotifier};
use package_transfer::utils::{self, ErrorLog};
use package_transfer::{BatchExecutor, BatchReport, TransferConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let config = match TransferConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            report_run_failure(&ErrorLog::new(DEFAULT_ERROR_FILE), None, &anyhow::Error::from(e));
            return ExitCode::FAILURE;
        }
    };

    match run(&config, args.log_level.as_deref()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report_run_failure(&ErrorLog::new(&config.log.error_file), config.email.as_ref(), &e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &TransferConfig, log_level: Option<&str>) -> Result<BatchReport> {
    let _log_guard = utils::logger::init(&config.log, log_level)?;

    tracing::info!("Starting package-transfer v{}", env!("CARGO_PKG_VERSION"));
    for warning in &config.warnings {
        tracing::warn!("{}", warning);
    }

    let result = execute(config);
    if let Err(e) = &result {
        tracing::error!("Run aborted: {:#}", e);
    }
    result
}

fn execute(config: &TransferConfig) -> Result<BatchReport> {
    config.check_folders()?;

    tracing::debug!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        backup = ?config.backup,
        "Folders checked"
    );

    let report = BatchExecutor::new(config).run()?;
    Ok(report)
}

/// Failures before or outside the per-package loop: console, error record
/// and, when enabled, email.
fn report_run_failure(error_log: &ErrorLog, email: Option<&EmailConfig>, err: &anyhow::Error) {
    eprintln!("Error: {:#}", err);

    if let Err(e) = error_log.append(&format!("{:?}", err)) {
        eprintln!("Failed to write {}: {}", error_log.path().display(), e);
    }

    if let Some(email) = email.filter(|email| email.notify_on_run_failure) {
        let notifier = SmtpNotifier::new(email.clone());
        if let Err(e) = notifier.notify("Package transfer run failed", &format!("{:?}", err)) {
            eprintln!("{}", e);
        }
    }
}
