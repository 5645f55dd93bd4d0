//! Cache error types.

use stats_core::StatsError;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a cache store or during the connection attempt.
///
/// These never escape [`CacheOperations`](crate::CacheOperations); they are
/// logged and turned into misses. Only the manager's health check returns one.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// The single connection attempt failed.
    #[error("Failed to connect to cache at {target}: {message}")]
    Connection { target: String, message: String },

    /// The connection attempt did not finish in time.
    #[error("Cache connection to {target} timed out after {after:?}")]
    Timeout { target: String, after: Duration },

    /// The store rejected or failed a command.
    #[error("Cache store error: {0}")]
    Store(String),
}

/// Result type for cache store calls.
pub type CacheResult<T> = Result<T, CacheError>;

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::Store(err.to_string())
    }
}

impl From<CacheError> for StatsError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::Timeout { .. } => StatsError::Timeout(err.to_string()),
            CacheError::Connection { .. } | CacheError::Store(_) => StatsError::Cache(err.to_string()),
        }
    }
}
