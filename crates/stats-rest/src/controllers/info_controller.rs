//! Service info controller.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Name reported by the service info endpoint.
pub const SERVICE_NAME: &str = "github-readme-stats";

/// Service info response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    /// Human-readable list of the public endpoints.
    pub endpoints: Vec<String>,
}

/// Service info endpoint.
#[utoipa::path(
    get,
    path = "/",
    tag = "info",
    responses(
        (status = 200, description = "Service name, version and endpoints", body = ServiceInfo)
    )
)]
pub async fn service_info() -> Json<ServiceInfo> {
    let endpoints = [
        "/health - Health check",
        "/healthz - Health check",
        "/ready - Readiness check",
        "/readyz - Strict readiness check",
        "/api-docs/openapi.json - OpenAPI document",
    ];

    Json(ServiceInfo {
        name: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: endpoints.iter().map(ToString::to_string).collect(),
    })
}
