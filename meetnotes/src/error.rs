use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to generate summary.";
pub const EMAIL_FAILED_MESSAGE: &str = "Failed to send email.";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";
const INTERNAL_MESSAGE: &str = "An internal error occurred.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported attachment: {0}")]
    UnsupportedAttachment(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },

    #[error("Summary generation failed: {0}")]
    Summarization(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Mail unavailable: {0}")]
    MailUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnsupportedAttachment(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Summarization(_)
            | AppError::Delivery(_)
            | AppError::Llm(_)
            | AppError::LlmUnavailable(_)
            | AppError::Mail(_)
            | AppError::MailUnavailable(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the caller. Provider and I/O details stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::UnsupportedAttachment(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::RateLimited { .. } => RATE_LIMITED_MESSAGE.to_string(),
            AppError::Summarization(_) => SUMMARY_FAILED_MESSAGE.to_string(),
            AppError::Delivery(_) => EMAIL_FAILED_MESSAGE.to_string(),
            AppError::Llm(_)
            | AppError::LlmUnavailable(_)
            | AppError::Mail(_)
            | AppError::MailUnavailable(_)
            | AppError::Io(_)
            | AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": self.client_message(),
            "code": status.as_u16()
        }));

        let mut response = (status, body).into_response();
        if let AppError::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
