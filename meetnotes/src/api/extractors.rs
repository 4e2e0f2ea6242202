use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{BytesRejection, FormRejection, JsonRejection};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, StatusCode};
use axum::Form;
use bytes::Bytes;

use crate::api::dto::SummarizeRequest;
use crate::api::state::AppState;
use crate::error::AppError;
use crate::transcript::{ensure_plain_text, StagedUpload, UploadStager};

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

impl From<MultipartError> for AppError {
    fn from(error: MultipartError) -> Self {
        body_error(error.status(), error.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        body_error(rejection.status(), rejection.body_text())
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        body_error(rejection.status(), rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        body_error(rejection.status(), rejection.body_text())
    }
}

fn body_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body too large.".to_string())
    } else {
        AppError::Validation(message)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            AppError::Validation(format!("Invalid JSON: {}", err.body_text()))
        }
        JsonRejection::JsonSyntaxError(err) => {
            AppError::Validation(format!("JSON syntax error: {}", err.body_text()))
        }
        JsonRejection::MissingJsonContentType(_) => {
            AppError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(err) => err.into(),
        _ => AppError::Validation(rejection.body_text()),
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BodyKind {
    Multipart,
    Json,
    UrlEncoded,
    Other,
}

fn body_kind(request: &Request) -> BodyKind {
    let essence = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match essence.as_str() {
        "multipart/form-data" => BodyKind::Multipart,
        "application/x-www-form-urlencoded" => BodyKind::UrlEncoded,
        value if value == "application/json" || value.ends_with("+json") => BodyKind::Json,
        _ => BodyKind::Other,
    }
}

/// Input of `POST /api/summarize`, from a multipart form, JSON, or a
/// urlencoded form.
///
/// A multipart `file` part is checked for plain text and streamed to a
/// temporary file before the handler runs. Unrecognized content types yield
/// an empty form, which fails later with the transcript-required message.
#[derive(Debug, Default)]
pub struct SummarizeForm {
    pub transcript: Option<String>,
    pub prompt: Option<String>,
    pub upload: Option<StagedUpload>,
}

impl From<SummarizeRequest> for SummarizeForm {
    fn from(request: SummarizeRequest) -> Self {
        Self {
            transcript: request.transcript,
            prompt: request.prompt,
            upload: None,
        }
    }
}

impl FromRequest<AppState> for SummarizeForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match body_kind(&req) {
            BodyKind::Multipart => {
                let multipart = Multipart::from_request(req, state).await?;
                read_multipart(multipart, &state.stager).await
            }
            BodyKind::Json => {
                let bytes = read_limited(req, state).await?;
                if bytes.is_empty() {
                    return Ok(Self::default());
                }
                let request: SummarizeRequest = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::Validation(format!("Invalid JSON: {e}")))?;
                Ok(request.into())
            }
            BodyKind::UrlEncoded => {
                let Form(request) = Form::<SummarizeRequest>::from_request(req, state).await?;
                Ok(request.into())
            }
            BodyKind::Other => {
                tracing::debug!("Summarize request without a supported body type");
                Ok(Self::default())
            }
        }
    }
}

async fn read_limited(req: Request, state: &AppState) -> Result<Bytes, AppError> {
    let limit = state.config.upload.json_body_limit;
    let bytes = Bytes::from_request(req, state).await?;
    if bytes.len() > limit {
        return Err(AppError::PayloadTooLarge(format!(
            "Request body too large (max {limit} bytes)."
        )));
    }
    Ok(bytes)
}

async fn read_multipart(
    mut multipart: Multipart,
    stager: &UploadStager,
) -> Result<SummarizeForm, AppError> {
    let mut form = SummarizeForm::default();

    if let Err(error) = collect_fields(&mut multipart, stager, &mut form).await {
        if let Some(upload) = form.upload.take() {
            upload.discard();
        }
        return Err(error);
    }

    Ok(form)
}

async fn collect_fields(
    multipart: &mut Multipart,
    stager: &UploadStager,
    form: &mut SummarizeForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                ensure_plain_text(field.content_type(), field.file_name())?;
                let file_name = field.file_name().map(str::to_string);
                let staged = stager.stage(file_name, Box::pin(field)).await?;
                // last file part wins
                if let Some(previous) = form.upload.replace(staged) {
                    previous.discard();
                }
            }
            "transcript" => form.transcript = Some(field.text().await?),
            "prompt" => form.prompt = Some(field.text().await?),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(())
}
