//! Logging configuration using tracing.

use crate::config::LogConfig;
use crate::utils::error_log::TIMESTAMP_FORMAT;
use anyhow::Context;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the run's subscriber and make it the default for the current thread.
///
/// Logging stays active while the returned guard is alive. `RUST_LOG` takes
/// precedence over `level_override`, which takes precedence over the
/// configured level.
pub fn init(config: &LogConfig, level_override: Option<&str>) -> anyhow::Result<DefaultGuard> {
    let level = level_override.unwrap_or(&config.level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = if config.enabled {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.file)
            .with_context(|| format!("cannot open log file {}", config.file.display()))?;

        Some(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false)
                .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string())),
        )
    } else {
        None
    };

    let console_layer = if config.enabled {
        None
    } else {
        Some(fmt::layer().with_writer(std::io::stderr))
    };

    let guard = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .set_default();

    Ok(guard)
}
