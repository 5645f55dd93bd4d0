//! Graceful shutdown with a hard deadline.
//!
//! The first termination signal stops the listener from accepting new
//! connections and starts the deadline timer. If in-flight requests drain
//! and the cache connection closes before the deadline, the process exits 0.
//! Otherwise it exits 1 without waiting any longer.

use parking_lot::RwLock;
use stats_cache::CacheManager;
use stats_config::ShutdownConfig;
use std::fmt;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;
use tokio_util::sync::CancellationToken;

/// Tracing target for shutdown events.
pub const TRACING_TARGET_SHUTDOWN: &str = "shutdown";

/// Lifecycle of the process. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ShutdownState {
    Running,
    /// Signal received; no new connections, in-flight requests finishing.
    Draining,
    Closed,
}

impl fmt::Display for ShutdownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Draining => write!(f, "draining"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// How the server stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Drained and released the cache before the deadline.
    Graceful,
    /// The deadline fired first.
    Forced,
    /// The server stopped on its own, without a signal.
    Failed,
}

impl ShutdownOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Graceful => 0,
            Self::Forced | Self::Failed => 1,
        }
    }
}

/// Orchestrates the Running → Draining → Closed sequence.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    deadline: Duration,
    token: CancellationToken,
    state: RwLock<ShutdownState>,
}

impl ShutdownCoordinator {
    /// Create a coordinator with the given hard deadline.
    #[must_use]
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            token: CancellationToken::new(),
            state: RwLock::new(ShutdownState::Running),
        }
    }

    /// Create a coordinator from configuration.
    #[must_use]
    pub fn from_config(config: &ShutdownConfig) -> Self {
        Self::new(config.deadline())
    }

    /// Token cancelled when draining starts. Hand it to the listener.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> ShutdownState {
        *self.state.read()
    }

    /// Hard deadline measured from the signal.
    #[must_use]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Runs `serve` until `signal` fires, then drains against the deadline.
    ///
    /// `serve` must stop accepting connections once [`token`](Self::token)
    /// is cancelled and resolve when in-flight requests have finished. Exactly
    /// one outcome is returned; the losing branch is dropped unfinished.
    pub async fn drive<S, F>(&self, signal: S, serve: F, cache: &CacheManager) -> ShutdownOutcome
    where
        S: Future<Output = ()>,
        F: Future<Output = io::Result<()>>,
    {
        tokio::pin!(serve);

        tokio::select! {
            () = signal => {}
            result = &mut serve => {
                match result {
                    Ok(()) => tracing::error!(
                        target: TRACING_TARGET_SHUTDOWN,
                        "HTTP server stopped without a shutdown signal"
                    ),
                    Err(e) => tracing::error!(
                        target: TRACING_TARGET_SHUTDOWN,
                        error = %e,
                        "HTTP server failed"
                    ),
                }
                self.advance(ShutdownState::Closed);
                cache.close().await;
                return ShutdownOutcome::Failed;
            }
        }

        self.advance(ShutdownState::Draining);
        self.token.cancel();
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            deadline_secs = self.deadline.as_secs(),
            "Shutting down gracefully"
        );

        let drain = async {
            if let Err(e) = serve.await {
                tracing::warn!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %e,
                    "HTTP server reported an error while draining"
                );
            }
            tracing::info!(target: TRACING_TARGET_SHUTDOWN, "HTTP server closed");
            cache.close().await;
        };

        let outcome = tokio::select! {
            () = drain => {
                tracing::info!(target: TRACING_TARGET_SHUTDOWN, "Shutdown complete");
                ShutdownOutcome::Graceful
            }
            () = tokio::time::sleep(self.deadline) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    deadline_secs = self.deadline.as_secs(),
                    "Forced shutdown after timeout"
                );
                ShutdownOutcome::Forced
            }
        };

        self.advance(ShutdownState::Closed);
        outcome
    }

    fn advance(&self, next: ShutdownState) {
        let mut state = self.state.write();
        if next > *state {
            *state = next;
        }
    }
}

/// Waits for SIGTERM or SIGINT (Ctrl+C).
///
/// Once this returns the handlers stay installed, so later signals no longer
/// terminate the process and are ignored while draining.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %e,
                "Failed to install Ctrl+C handler"
            );
            std::future::pending::<()>().await;
        } else {
            tracing::info!(target: TRACING_TARGET_SHUTDOWN, "SIGINT received");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!(target: TRACING_TARGET_SHUTDOWN, "SIGTERM received");
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %e,
                    "Failed to install SIGTERM handler"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
