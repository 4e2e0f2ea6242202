use axum::extract::State;
use axum::Json;
use chrono::{SecondsFormat, Utc};

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// `GET /api/health`
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: state.config.server.service_name.clone(),
        time: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
