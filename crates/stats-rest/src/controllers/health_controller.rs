//! Health and readiness controller.

use crate::probes::{HealthResponse, ReadyResponse, StrictCacheStatus, StrictReadiness};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

/// Strict readiness response.
///
/// Either `{status: "ready", cache}` or `{status: "not ready", error}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyzResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<StrictCacheStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<StrictReadiness> for (StatusCode, ReadyzResponse) {
    fn from(readiness: StrictReadiness) -> Self {
        match readiness {
            StrictReadiness::Ready(cache) => (
                StatusCode::OK,
                ReadyzResponse {
                    status: "ready".to_string(),
                    cache: Some(cache),
                    error: None,
                },
            ),
            StrictReadiness::NotReady(error) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ReadyzResponse {
                    status: "not ready".to_string(),
                    cache: None,
                    error: Some(error),
                },
            ),
        }
    }
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(healthz))
        .route("/ready", get(ready))
        .route("/readyz", get(readyz))
}

/// Liveness endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.health.check())
}

/// Liveness endpoint, Kubernetes spelling.
#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse)
    )
)]
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.health.check())
}

/// Readiness endpoint. Always ready; the cache status may be degraded.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
pub async fn ready(State(state): State<AppState>) -> Json<ReadyResponse> {
    Json(state.readiness.check().await)
}

/// Strict readiness endpoint. 503 when the cache health check errors.
#[utoipa::path(
    get,
    path = "/readyz",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyzResponse),
        (status = 503, description = "Cache health check failed", body = ReadyzResponse)
    )
)]
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyzResponse>) {
    let (status, body): (StatusCode, ReadyzResponse) = state.readiness.check_strict().await.into();
    (status, Json(body))
}
