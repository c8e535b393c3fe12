use std::sync::Arc;
use tracing::{debug, warn};

use super::{Mailer, OutgoingEmail, templates};

/// Renders account emails and dispatches them in the background.
///
/// Sends are fire-and-forget: a failed delivery is logged and counted but never
/// surfaces as an error to the request that triggered it.
#[derive(Clone)]
pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    app_url: String,
}

impl Notifier {
    #[must_use]
    pub fn new(mailer: Arc<dyn Mailer>, app_url: &str) -> Self {
        Self {
            mailer,
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/auth/verify/{token}", self.app_url)
    }

    #[must_use]
    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/auth/reset-password/{token}", self.app_url)
    }

    pub fn send_verification(&self, to: &str, token: &str) {
        self.dispatch(templates::verification(to, &self.verification_link(token)));
    }

    pub fn send_password_reset(&self, to: &str, token: &str) {
        self.dispatch(templates::password_reset(to, &self.reset_link(token)));
    }

    fn dispatch(&self, email: OutgoingEmail) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            match mailer.send(&email).await {
                Ok(()) => {
                    debug!(to = %email.to, subject = %email.subject, "Email dispatched");
                    metrics::counter!("emails_sent_total", "result" => "ok").increment(1);
                }
                Err(e) => {
                    warn!(to = %email.to, subject = %email.subject, error = %e, "Failed to send email");
                    metrics::counter!("emails_sent_total", "result" => "error").increment(1);
                }
            }
        });
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("app_url", &self.app_url)
            .finish_non_exhaustive()
    }
}
