use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meetnotes API",
        version = "0.1.0",
        description = "Turns meeting transcripts into structured summaries and emails them.",
    ),
    paths(
        handlers::health::health_check,
        handlers::summarize::summarize,
        handlers::email::send_email,
    ),
    components(schemas(
        dto::SummarizeRequest,
        dto::SummarizeResponse,
        dto::SendEmailRequest,
        dto::SendEmailResponse,
        dto::HealthResponse,
        dto::ErrorResponse,
    )),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "summaries", description = "Transcript summarization"),
        (name = "email", description = "Summary delivery over SMTP"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
