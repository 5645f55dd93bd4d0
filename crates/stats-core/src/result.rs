//! Result type aliases for the readme-stats server.

use crate::StatsError;

/// A specialized `Result` type for server operations.
pub type StatsResult<T> = Result<T, StatsError>;
