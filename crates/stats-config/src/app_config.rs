//! Application configuration structures.

use serde::{Deserialize, Serialize};
use stats_core::TelemetryConfig;
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Optional cache store configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Readiness probe configuration.
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Graceful shutdown configuration.
    #[serde(default)]
    pub shutdown: ShutdownConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: TelemetryConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Enable CORS headers.
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Returns the listen address.
    #[must_use]
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Cache store configuration.
///
/// The cache is enabled only when `host` is present and non-empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache host. `None` disables the cache for the process lifetime.
    pub host: Option<String>,
    /// Cache port.
    pub port: u16,
    /// Upper bound on the single connection attempt, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 6379,
            connect_timeout_ms: 5000,
        }
    }
}

impl CacheConfig {
    /// Returns `true` if a cache target was supplied.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.host.as_deref().is_some_and(|h| !h.trim().is_empty())
    }

    /// Returns the `redis://host:port` URL, or `None` when unconfigured.
    #[must_use]
    pub fn url(&self) -> Option<String> {
        if !self.is_configured() {
            return None;
        }
        self.host
            .as_deref()
            .map(|host| format!("redis://{}:{}", host.trim(), self.port))
    }

    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Readiness probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Bound on the cache health check inside the readiness probe, in milliseconds.
    pub cache_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cache_timeout_ms: 2000,
        }
    }
}

impl ProbeConfig {
    /// Returns the cache check bound as a Duration.
    #[must_use]
    pub const fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }
}

/// Graceful shutdown configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// Hard deadline after the first termination signal, in seconds.
    pub deadline_secs: u64,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self { deadline_secs: 10 }
    }
}

impl ShutdownConfig {
    /// Returns the deadline as a Duration.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}
