use crate::api::models::health::HealthResponse;
use axum::Json;

/// Service status.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    summary = "Service status",
    responses(
        (status = 200, description = "The service is running", body = HealthResponse),
    )
)]
pub async fn root() -> Json<HealthResponse> {
    Json(HealthResponse::running())
}

/// Liveness probe for orchestrators.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    summary = "Liveness probe",
    responses(
        (status = 200, description = "The process is alive", body = String, content_type = "text/plain"),
    )
)]
pub async fn healthz() -> &'static str {
    "OK"
}
