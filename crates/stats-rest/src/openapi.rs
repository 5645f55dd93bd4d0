//! OpenAPI documentation.

use crate::controllers::{ReadyzResponse, ServiceInfo};
use crate::probes::{CacheStatus, HealthResponse, ReadyResponse, StrictCacheStatus};
use utoipa::OpenApi;

/// OpenAPI document for the readme-stats server.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "readme-stats server",
        description = "Probe and service endpoints of the readme-stats server",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    paths(
        crate::controllers::health_controller::health,
        crate::controllers::health_controller::healthz,
        crate::controllers::health_controller::ready,
        crate::controllers::health_controller::readyz,
        crate::controllers::info_controller::service_info,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            ReadyzResponse,
            CacheStatus,
            StrictCacheStatus,
            ServiceInfo,
        )
    ),
    tags(
        (name = "health", description = "Liveness and readiness probes"),
        (name = "info", description = "Service information")
    )
)]
pub struct ApiDoc;
