//! Outbound email.
//!
//! Services never talk to SMTP directly. They hand messages to a [`Notifier`],
//! which renders them and ships them through whichever [`Mailer`] is
//! configured, off the request path.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

pub mod notifier;
pub mod smtp;
pub mod templates;

pub use notifier::Notifier;
pub use smtp::SmtpMailer;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Used when SMTP is not configured. Messages are logged, never delivered.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        // The body carries live verification and reset links.
        info!(
            to = %email.to,
            subject = %email.subject,
            "Email delivery disabled, logging message instead"
        );
        debug!(body = %templates::plain_text(&email.html), "Undelivered email body");
        Ok(())
    }
}
