//! Application state for Axum handlers.

use crate::probes::{HealthProbe, ReadinessProbe};
use stats_cache::{CacheManager, CacheOperations};
use std::time::Duration;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Best-effort cache for card handlers.
    pub cache: CacheOperations,
    pub health: HealthProbe,
    pub readiness: ReadinessProbe,
}

impl AppState {
    /// Creates the state around the process-wide cache manager.
    #[must_use]
    pub fn new(manager: CacheManager, probe_timeout: Duration) -> Self {
        Self {
            cache: CacheOperations::new(manager.clone()),
            health: HealthProbe,
            readiness: ReadinessProbe::new(manager, probe_timeout),
        }
    }
}
