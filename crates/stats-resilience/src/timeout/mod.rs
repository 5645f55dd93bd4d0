//! Timeout wrappers for async operations.

use stats_core::StatsError;
use std::future::Future;
use std::time::Duration;

/// Wraps an async operation with a timeout.
///
/// If the timer fires first the operation's future is dropped, so a result
/// that would have arrived later is discarded.
pub async fn with_timeout<F, Fut, T>(duration: Duration, f: F) -> Result<T, StatsError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, StatsError>>,
{
    tokio::time::timeout(duration, f())
        .await
        .map_err(|_| StatsError::Timeout(format!("Operation timed out after {:?}", duration)))?
}

/// Outcome of racing an infallible future against a timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Race<T> {
    /// The future resolved before the timer.
    Completed(T),
    /// The timer fired first; the future was dropped.
    TimedOut,
}

/// Races `fut` against a timer of `duration`.
pub async fn race_timeout<Fut, T>(duration: Duration, fut: Fut) -> Race<T>
where
    Fut: Future<Output = T>,
{
    tokio::select! {
        value = fut => Race::Completed(value),
        () = tokio::time::sleep(duration) => Race::TimedOut,
    }
}
