use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};
use std::time::Duration;
use tokio::task;
use tracing::debug;

use super::{MailError, Mailer, OutgoingEmail, templates};
use crate::config::EmailConfig;

/// Implicit TLS port. Anything else goes through STARTTLS.
const SMTPS_PORT: u16 = 465;

pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, MailError> {
        let from_address: Address = self
            .config
            .from_address
            .parse()
            .map_err(|e| MailError::Address(format!("from: {e}")))?;
        let from = Mailbox::new(Some(self.config.from_name.clone()), from_address);

        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| MailError::Address(format!("to: {e}")))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                templates::plain_text(&email.html),
                email.html.clone(),
            ))
            .map_err(|e| MailError::Message(e.to_string()))
    }

    fn transport(&self) -> Result<SmtpTransport, MailError> {
        let builder = if self.config.port == SMTPS_PORT {
            SmtpTransport::relay(&self.config.host)
        } else {
            SmtpTransport::starttls_relay(&self.config.host)
        }
        .map_err(|e| MailError::Transport(e.to_string()))?;

        let mut builder = builder
            .port(self.config.port)
            .timeout(Some(Duration::from_secs(self.config.timeout_seconds)));

        if !self.config.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let message = self.build_message(email)?;
        let transport = self.transport()?;
        let to = email.to.clone();

        // The SMTP client is blocking.
        task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| MailError::Transport(format!("send task failed: {e}")))?
            .map_err(|e| MailError::Transport(e.to_string()))?;

        debug!(to = %to, "Email sent");
        Ok(())
    }
}
