use axum::extract::State;
use axum::Json;
use validator::Validate;

use crate::api::dto::{ErrorResponse, SendEmailRequest, SendEmailResponse};
use crate::api::extractors::AppJson;
use crate::api::state::AppState;
use crate::error::{AppError, Result};

/// `POST /api/send-email`
#[utoipa::path(
    post,
    path = "/api/send-email",
    tag = "email",
    request_body = SendEmailRequest,
    responses(
        (status = 200, description = "Email accepted by the SMTP server", body = SendEmailResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Delivery failed", body = ErrorResponse),
    )
)]
pub async fn send_email(
    State(state): State<AppState>,
    AppJson(req): AppJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>> {
    req.validate()
        .map_err(|e| AppError::Validation(format!("Invalid request: {e}")))?;

    let message_id = state
        .delivery
        .send_summary(
            req.to.as_deref(),
            req.subject.as_deref(),
            req.summary.as_deref(),
        )
        .await?;

    Ok(Json(SendEmailResponse {
        ok: true,
        message_id,
    }))
}
