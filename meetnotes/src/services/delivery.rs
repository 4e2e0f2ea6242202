use std::sync::Arc;

use lettre::message::Mailboxes;

use crate::error::{AppError, Result};
use crate::mail::Mailer;

pub const DEFAULT_SUBJECT: &str = "Meeting Summary";
pub const REQUIRED_FIELDS_MESSAGE: &str = "Fields 'to' and 'summary' are required.";
const INVALID_RECIPIENT_MESSAGE: &str = "Invalid recipient address.";

/// Delivery gateway: validates the request, then hands it to the [`Mailer`].
#[derive(Clone)]
pub struct DeliveryService {
    mailer: Arc<dyn Mailer>,
}

impl DeliveryService {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    /// Send `summary` to `to` and return the message identifier.
    ///
    /// Missing or malformed input fails before the mailer is touched.
    pub async fn send_summary(
        &self,
        to: Option<&str>,
        subject: Option<&str>,
        summary: Option<&str>,
    ) -> Result<String> {
        let to = to.map(str::trim).filter(|value| !value.is_empty());
        let summary = summary.filter(|value| !value.trim().is_empty());

        let (Some(to), Some(summary)) = (to, summary) else {
            return Err(AppError::Validation(REQUIRED_FIELDS_MESSAGE.to_string()));
        };

        // `to` may list several comma-separated recipients
        let recipients = to.parse::<Mailboxes>().ok();
        if recipients.map_or(true, |list| list.iter().next().is_none()) {
            return Err(AppError::Validation(INVALID_RECIPIENT_MESSAGE.to_string()));
        }

        let subject = subject
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_SUBJECT);

        let message_id = self
            .mailer
            .send(to, subject, summary)
            .await
            .map_err(|error| AppError::Delivery(error.to_string()))?;

        tracing::info!(message_id = %message_id, "Summary email sent");
        Ok(message_id)
    }
}
