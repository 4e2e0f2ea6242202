use std::time::Duration;

use lettre::{
    message::{
        header::{self, ContentType},
        Mailbox, Mailboxes,
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Message, SmtpTransport, Transport,
};
use uuid::Uuid;

use crate::config::MailConfig;
use crate::error::{AppError, Result};

/// Plain-text mail delivery over SMTP.
///
/// `secure` selects implicit TLS. Otherwise the connection upgrades with
/// STARTTLS when the server offers it.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from = config
            .from_address()
            .ok_or_else(|| AppError::Mail("FROM_EMAIL or SMTP_USER must be set".to_string()))?
            .parse::<Mailbox>()
            .map_err(|e| AppError::Mail(format!("Invalid from address: {e}")))?;

        let tls_parameters = TlsParameters::new(config.host.clone())
            .map_err(|e| AppError::Mail(format!("Invalid TLS parameters: {e}")))?;
        let tls = if config.secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder = SmtpTransport::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls)
            .timeout(Some(Duration::from_secs(config.timeout_secs)));

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    pub fn from_mailbox(&self) -> &Mailbox {
        &self.from
    }

    /// `<uuid@domain>` using the sender's domain.
    fn generate_message_id(&self) -> String {
        format!("<{}@{}>", Uuid::new_v4(), self.from.email.domain())
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<(Message, String)> {
        let to = to
            .parse::<Mailboxes>()
            .map_err(|e| AppError::Mail(format!("Invalid recipient address: {e}")))?;
        if to.iter().next().is_none() {
            return Err(AppError::Mail("No recipient address".to_string()));
        }
        let message_id = self.generate_message_id();

        let message = Message::builder()
            .from(self.from.clone())
            .mailbox(header::To::from(to))
            .subject(subject)
            .message_id(Some(message_id.clone()))
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| AppError::Mail(format!("Failed to build message: {e}")))?;

        Ok((message, message_id))
    }

    /// Submit one message and return its `Message-ID`.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        let (message, message_id) = self.build_message(to, subject, body)?;
        let transport = self.transport.clone();

        // The SMTP client is blocking; keep it off the async workers.
        let response = tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| AppError::Internal(format!("SMTP task failed: {e}")))?
            .map_err(|e| AppError::Mail(format!("SMTP send failed: {e}")))?;

        tracing::debug!(
            code = %response.code(),
            message_id = %message_id,
            "SMTP server accepted message"
        );

        Ok(message_id)
    }
}
