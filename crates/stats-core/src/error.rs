//! Unified error types for the server.

use thiserror::Error;

/// Unified error type for the readme-stats server.
///
/// Cache failures are absorbed inside the cache layer, so errors that reach
/// a caller come from startup.
#[derive(Error, Debug)]
pub enum StatsError {
    // ============ Startup Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// I/O error (binding, serving)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ============ Infrastructure Errors ============
    /// Cache store error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StatsError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Cache(_) | Self::Timeout(_) => 503,
            Self::Configuration(_) | Self::Io(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a cache error.
    #[must_use]
    pub fn cache<T: Into<String>>(message: T) -> Self {
        Self::Cache(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is a bounded wait that expired.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(StatsError::cache("ping failed").status_code(), 503);
        assert_eq!(StatsError::Timeout("2s".to_string()).status_code(), 503);
        assert_eq!(StatsError::configuration("bad port").status_code(), 500);
        assert_eq!(StatsError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(StatsError::cache("x").error_code(), "CACHE_ERROR");
        assert_eq!(StatsError::Timeout("t".to_string()).error_code(), "TIMEOUT");
        assert_eq!(StatsError::configuration("c").error_code(), "CONFIGURATION_ERROR");
        assert_eq!(StatsError::internal("i").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: StatsError = io.into();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.to_string().contains("port taken"));
    }

    #[test]
    fn test_is_timeout() {
        assert!(StatsError::Timeout("probe".to_string()).is_timeout());
        assert!(!StatsError::cache("down").is_timeout());
    }
}
