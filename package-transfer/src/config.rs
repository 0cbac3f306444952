//! Configuration management for package transfer.
//!
//! Settings are read once from a TOML file and validated into a
//! [`TransferConfig`], which is then passed around by reference.

use crate::utils::errors::{Result, TransferError};
use encoding_rs::Encoding;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "settings.toml";
pub const DEFAULT_LOG_FILE: &str = "app.log";
pub const DEFAULT_ERROR_FILE: &str = "ERRORS.txt";

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Folder scanned for packages
    pub source: PathBuf,

    /// Folder validated packages are moved into
    pub destination: PathBuf,

    /// Optional archive root for dated copies
    pub backup: Option<PathBuf>,

    /// Failure notifications; `None` disables email
    pub email: Option<EmailConfig>,

    pub log: LogConfig,

    pub manifest: ManifestConfig,

    /// Problems found while loading that did not stop it; logged once the
    /// logger is up
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    /// SMTP server as `host` or `host:port`
    pub server: String,

    /// Recipient address
    pub to: String,

    /// Sender address
    pub from: String,

    /// Also mail failures that stop the whole run
    pub notify_on_run_failure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Write the debug log to `file`; otherwise log to stderr
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Rolling debug log
    pub file: PathBuf,

    /// Append-only error record
    pub error_file: PathBuf,
}

#[derive(Debug, Clone, Copy)]
pub struct ManifestConfig {
    /// Encoding tried when a descriptor is not valid UTF-8
    pub fallback_encoding: &'static Encoding,
}

// Raw file layout. Every value is optional here; `TransferConfig::from_settings`
// decides what is required.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    main: MainSection,
    backup: BackupSection,
    email: EmailSection,
    logs: LogsSection,
    manifest: ManifestSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MainSection {
    source_path: Option<String>,
    destination_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BackupSection {
    backup_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmailSection {
    smtp_server: Option<String>,
    mail_to: Option<String>,
    mail_from: Option<String>,
    notify_on_run_failure: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LogsSection {
    log_enable: bool,
    level: String,
    log_file: String,
    error_file: String,
}

impl Default for LogsSection {
    fn default() -> Self {
        Self {
            log_enable: true,
            level: default_log_level(),
            log_file: DEFAULT_LOG_FILE.to_string(),
            error_file: DEFAULT_ERROR_FILE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ManifestSection {
    fallback_encoding: String,
}

impl Default for ManifestSection {
    fn default() -> Self {
        Self {
            fallback_encoding: "windows-1251".to_string(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Empty strings in the settings file mean "not set".
fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TransferConfig {
    /// Configuration with only the two required folders and default settings.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            backup: None,
            email: None,
            log: LogConfig::default(),
            manifest: ManifestConfig::default(),
            warnings: Vec::new(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TransferError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| TransferError::Config(e.to_string()))?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Settings) -> Result<Self> {
        let source = non_empty(settings.main.source_path).ok_or_else(|| {
            TransferError::Config("required setting main.source_path is missing".to_string())
        })?;
        let destination = non_empty(settings.main.destination_path).ok_or_else(|| {
            TransferError::Config("required setting main.destination_path is missing".to_string())
        })?;

        let mut warnings = Vec::new();
        let email = settings.email;
        let email = match (
            non_empty(email.smtp_server),
            non_empty(email.mail_to),
            non_empty(email.mail_from),
        ) {
            (Some(server), Some(to), Some(from)) => Some(EmailConfig {
                server,
                to,
                from,
                notify_on_run_failure: email.notify_on_run_failure,
            }),
            (None, None, None) => None,
            _ => {
                warnings.push(
                    "incomplete [email] settings (smtp_server, mail_to and mail_from are all required), notifications disabled"
                        .to_string(),
                );
                None
            }
        };

        let label = settings.manifest.fallback_encoding;
        let fallback_encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
            TransferError::Config(format!("unknown manifest.fallback_encoding '{}'", label))
        })?;

        Ok(Self {
            source: PathBuf::from(source),
            destination: PathBuf::from(destination),
            backup: non_empty(settings.backup.backup_path).map(PathBuf::from),
            email,
            log: LogConfig {
                enabled: settings.logs.log_enable,
                level: settings.logs.level,
                file: PathBuf::from(settings.logs.log_file),
                error_file: PathBuf::from(settings.logs.error_file),
            },
            manifest: ManifestConfig { fallback_encoding },
            warnings,
        })
    }

    /// Check that source, destination and backup exist, are directories and
    /// are three different folders.
    pub fn check_folders(&self) -> Result<()> {
        let source = existing_dir("source_path", &self.source)?;
        let destination = existing_dir("destination_path", &self.destination)?;
        let backup = self
            .backup
            .as_deref()
            .map(|path| existing_dir("backup_path", path))
            .transpose()?;

        let backup_clash = backup
            .as_ref()
            .is_some_and(|b| *b == source || *b == destination);
        if source == destination || backup_clash {
            return Err(TransferError::Config(
                "source, destination and backup folders must be different".to_string(),
            ));
        }

        Ok(())
    }
}

fn existing_dir(key: &str, path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(TransferError::Config(format!(
            "{} directory not found: {}",
            key,
            path.display()
        )));
    }
    path.canonicalize()
        .map_err(|e| TransferError::Config(format!("cannot resolve {}: {}", path.display(), e)))
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            file: PathBuf::from(DEFAULT_LOG_FILE),
            error_file: PathBuf::from(DEFAULT_ERROR_FILE),
        }
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            fallback_encoding: encoding_rs::WINDOWS_1251,
        }
    }
}
