use axum::extract::State;
use axum::Json;

use crate::api::dto::{ErrorResponse, SummarizeRequest, SummarizeResponse};
use crate::api::extractors::SummarizeForm;
use crate::api::state::AppState;
use crate::error::Result;
use crate::transcript::acquire_transcript;

/// `POST /api/summarize`
///
/// Accepts `multipart/form-data` with an optional plain-text `file` part, or
/// a JSON / urlencoded body. An uploaded file takes precedence over the
/// `transcript` field.
#[utoipa::path(
    post,
    path = "/api/summarize",
    tag = "summaries",
    request_body(content_type = "application/json", content = SummarizeRequest, description = "Transcript text and optional instruction. Also accepted as a urlencoded form, or as multipart/form-data with a plain-text `file` part"),
    responses(
        (status = 200, description = "Summary generated", body = SummarizeResponse),
        (status = 400, description = "Missing transcript or unsupported attachment", body = ErrorResponse),
        (status = 413, description = "Upload or body over the size limit", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Summary generation failed", body = ErrorResponse),
    )
)]
pub async fn summarize(
    State(state): State<AppState>,
    form: SummarizeForm,
) -> Result<Json<SummarizeResponse>> {
    let SummarizeForm {
        transcript,
        prompt,
        upload,
    } = form;

    if let Some(upload) = &upload {
        tracing::debug!(
            file_name = ?upload.file_name(),
            size = upload.size(),
            "Summarizing uploaded transcript"
        );
    }

    let transcript = acquire_transcript(transcript.as_deref(), upload).await?;
    let summary = state
        .summaries
        .summarize(&transcript, prompt.as_deref())
        .await?;

    Ok(Json(SummarizeResponse { summary }))
}
