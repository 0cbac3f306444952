//! Failure notifications by email.

use crate::config::EmailConfig;
use crate::utils::errors::{Result, TransferError};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};

const DEFAULT_SMTP_PORT: u16 = 25;

/// Delivers plain-text alerts. Callers log and swallow delivery errors.
pub trait Notifier {
    fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// Sends alerts through an SMTP relay without authentication or TLS.
#[derive(Debug, Clone)]
pub struct SmtpNotifier {
    config: EmailConfig,
    host_name: String,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        let host_name = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "package-transfer".to_string());
        Self { config, host_name }
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message> {
        let from: Mailbox = self
            .config
            .from
            .parse()
            .map_err(|e| TransferError::Notification(format!("invalid sender address: {}", e)))?;
        let to: Mailbox = self
            .config
            .to
            .parse()
            .map_err(|e| TransferError::Notification(format!("invalid recipient address: {}", e)))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(format!("[{}] {}", self.host_name, subject))
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| TransferError::Notification(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let message = self.build_message(subject, body)?;
        let (host, port) = split_server(&self.config.server);

        let mailer = SmtpTransport::builder_dangerous(host).port(port).build();
        mailer.send(&message).map_err(|e| {
            TransferError::Notification(format!("delivery via {} failed: {}", self.config.server, e))
        })?;

        Ok(())
    }
}

/// Split `host[:port]`, defaulting to port 25.
fn split_server(server: &str) -> (&str, u16) {
    match server.rsplit_once(':') {
        Some((host, port)) => match port.parse() {
            Ok(port) => (host, port),
            Err(_) => (server, DEFAULT_SMTP_PORT),
        },
        None => (server, DEFAULT_SMTP_PORT),
    }
}
