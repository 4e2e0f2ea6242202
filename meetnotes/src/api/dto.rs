//! Wire types for the HTTP API.
//!
//! Request fields are all optional on the wire so that missing values reach
//! the services and produce the documented validation messages instead of a
//! generic deserialization error.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// JSON or urlencoded body for `POST /api/summarize`.
///
/// Multipart requests carry the same fields plus an optional `file`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct SummarizeRequest {
    /// Raw transcript text. Ignored when a file is uploaded.
    pub transcript: Option<String>,
    /// Custom instruction. Blank falls back to the default instruction.
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SummarizeResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct SendEmailRequest {
    #[validate(length(max = 320))]
    pub to: Option<String>,
    /// Defaults to "Meeting Summary".
    #[validate(length(max = 998))]
    pub subject: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub ok: bool,
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    /// RFC 3339 timestamp, UTC, millisecond precision.
    pub time: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}
