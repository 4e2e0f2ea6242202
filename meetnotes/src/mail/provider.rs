use async_trait::async_trait;

use crate::config::MailConfig;
use crate::error::{AppError, Result};
use crate::mail::smtp::SmtpMailer;

/// Capability to deliver a plain-text message and report its identifier.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String>;
}

/// Production [`Mailer`]. Unavailable when no SMTP host is configured or
/// the transport could not be built.
#[derive(Clone)]
pub struct MailProvider {
    smtp: Option<SmtpMailer>,
    reason: Option<String>,
}

impl MailProvider {
    pub fn new(config: Option<&MailConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No SMTP configuration provided");
        };

        match SmtpMailer::new(config) {
            Ok(smtp) => Self {
                smtp: Some(smtp),
                reason: None,
            },
            Err(error) => Self::unavailable(&error.to_string()),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            smtp: None,
            reason: Some(reason.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.smtp.is_some()
    }
}

#[async_trait]
impl Mailer for MailProvider {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        match &self.smtp {
            Some(smtp) => smtp.send(to, subject, body).await,
            None => Err(AppError::MailUnavailable(
                self.reason
                    .clone()
                    .unwrap_or_else(|| "Mail transport not configured".to_string()),
            )),
        }
    }
}
