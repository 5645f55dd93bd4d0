//! Liveness and readiness probes.
//!
//! Liveness never looks at the cache. Readiness does, but only for a bounded
//! time: the cache is an accelerator, so a slow or failing store degrades the
//! reported cache status without making the service unready.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use stats_cache::CacheManager;
use stats_resilience::{race_timeout, Race};
use std::time::Duration;
use tracing::{debug, warn};
use utoipa::ToSchema;

/// Current time as RFC 3339 UTC with millisecond precision.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Time the probe answered.
    pub timestamp: String,
}

/// Cache status reported by the tolerant readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum CacheStatus {
    #[serde(rename = "not configured")]
    NotConfigured,
    #[serde(rename = "connected")]
    Connected,
    #[serde(rename = "disconnected")]
    Disconnected,
}

/// Tolerant readiness response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Always `"ready"`.
    pub status: String,
    /// Time the probe answered.
    pub timestamp: String,
    /// Cache reachability.
    pub cache: CacheStatus,
}

/// Cache status reported by the strict readiness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StrictCacheStatus {
    Ok,
    Unavailable,
}

/// Outcome of the strict readiness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrictReadiness {
    /// Ready, with the cache either answering or absent.
    Ready(StrictCacheStatus),
    /// The cache health check returned an error.
    NotReady(String),
}

/// Stateless liveness probe.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthProbe;

impl HealthProbe {
    /// Always reports `"ok"`.
    #[must_use]
    pub fn check(&self) -> HealthResponse {
        HealthResponse {
            status: "ok".to_string(),
            timestamp: timestamp(),
        }
    }
}

/// Readiness probe with a bounded cache check.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    manager: CacheManager,
    timeout: Duration,
}

impl ReadinessProbe {
    /// Create a probe that waits at most `timeout` for the cache.
    #[must_use]
    pub fn new(manager: CacheManager, timeout: Duration) -> Self {
        Self { manager, timeout }
    }

    /// The bound on the cache check.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The bound in whole milliseconds, saturating at `u64::MAX`.
    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Tolerant readiness: always ready, cache status degraded on any problem.
    ///
    /// If the timer wins, the health check is dropped and whatever it would
    /// have returned is discarded.
    pub async fn check(&self) -> ReadyResponse {
        let cache = if self.manager.is_configured() {
            match race_timeout(self.timeout, self.manager.health_check()).await {
                Race::Completed(Ok(true)) => CacheStatus::Connected,
                Race::Completed(Ok(false)) => CacheStatus::Disconnected,
                Race::Completed(Err(e)) => {
                    debug!(error = %e, "Cache health check failed");
                    CacheStatus::Disconnected
                }
                Race::TimedOut => {
                    warn!(timeout_ms = self.timeout_ms(), "Cache health check timed out");
                    CacheStatus::Disconnected
                }
            }
        } else {
            CacheStatus::NotConfigured
        };

        ReadyResponse {
            status: "ready".to_string(),
            timestamp: timestamp(),
            cache,
        }
    }

    /// Strict readiness: not ready only when the health check itself errors.
    ///
    /// An absent cache and a timed-out check both report `Unavailable`.
    pub async fn check_strict(&self) -> StrictReadiness {
        match race_timeout(self.timeout, self.manager.health_check()).await {
            Race::Completed(Ok(true)) => StrictReadiness::Ready(StrictCacheStatus::Ok),
            Race::Completed(Ok(false)) => StrictReadiness::Ready(StrictCacheStatus::Unavailable),
            Race::Completed(Err(e)) => {
                warn!(error = %e, "Cache health check failed, reporting not ready");
                StrictReadiness::NotReady(e.to_string())
            }
            Race::TimedOut => {
                warn!(timeout_ms = self.timeout_ms(), "Cache health check timed out");
                StrictReadiness::Ready(StrictCacheStatus::Unavailable)
            }
        }
    }
}
