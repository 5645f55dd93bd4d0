//! Process-wide cache connection manager.

use crate::{CacheConnector, CacheError, CacheResult, CacheStore, RedisConnector};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::RwLock;
use stats_config::CacheConfig;
use stats_core::StatsError;
use stats_resilience::{race_timeout, with_timeout, Race};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Lifecycle of the single cache connection.
///
/// `Uninitialized` leaves exactly once, to `Connected` or `FailedPermanently`.
/// `Connected` may later fall to `FailedPermanently` (failed health check) or
/// `Closed` (shutdown). Nothing ever returns to `Uninitialized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No cache target configured; every operation is a no-op.
    Unconfigured,
    /// Configured, no connection attempt made yet.
    Uninitialized,
    /// An open handle exists.
    Connected,
    /// The attempt failed, or the store stopped answering; never retried.
    FailedPermanently,
    /// Released during shutdown.
    Closed,
}

impl ConnectionState {
    /// Returns the state as a lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unconfigured => "unconfigured",
            Self::Uninitialized => "uninitialized",
            Self::Connected => "connected",
            Self::FailedPermanently => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bound on the QUIT sent by [`CacheManager::close`].
const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

type Attempt = Shared<BoxFuture<'static, ()>>;

struct Slot {
    state: ConnectionState,
    handle: Option<Arc<dyn CacheStore>>,
}

struct Inner {
    connector: Option<Arc<dyn CacheConnector>>,
    connect_timeout: Duration,
    slot: RwLock<Slot>,
    attempt: OnceLock<Attempt>,
    attempts: AtomicU32,
}

/// Owns the one connection to the external cache store.
///
/// Cloning is cheap and every clone shares the same connection and state.
/// The connection is opened lazily by the first [`acquire`](Self::acquire);
/// concurrent callers during that first attempt all wait on the same result.
#[derive(Clone)]
pub struct CacheManager {
    inner: Arc<Inner>,
}

impl CacheManager {
    /// Create a manager that will connect through `connector` on first use.
    #[must_use]
    pub fn new(connector: Arc<dyn CacheConnector>, connect_timeout: Duration) -> Self {
        Self::build(Some(connector), connect_timeout, ConnectionState::Uninitialized)
    }

    /// Create a manager with no cache target. It never connects.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::build(None, Duration::ZERO, ConnectionState::Unconfigured)
    }

    /// Create a Redis-backed manager from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        match config.url() {
            Some(url) => Self::new(Arc::new(RedisConnector::new(url)), config.connect_timeout()),
            None => Self::unconfigured(),
        }
    }

    fn build(
        connector: Option<Arc<dyn CacheConnector>>,
        connect_timeout: Duration,
        state: ConnectionState,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                connector,
                connect_timeout,
                slot: RwLock::new(Slot {
                    state,
                    handle: None,
                }),
                attempt: OnceLock::new(),
                attempts: AtomicU32::new(0),
            }),
        }
    }

    /// Current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.slot.read().state
    }

    /// Returns `true` if a cache target was configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.inner.connector.is_some()
    }

    /// The configured connection target, if any.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        self.inner.connector.as_deref().map(|c| c.target())
    }

    /// Number of connection attempts made so far (0 or 1).
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.inner.attempts.load(Ordering::SeqCst)
    }

    /// Returns the open handle, or `None` if the cache is unavailable.
    ///
    /// In `Uninitialized` this performs the one connection attempt. Dropping
    /// the returned future does not cancel that attempt.
    pub async fn acquire(&self) -> Option<Arc<dyn CacheStore>> {
        match self.state() {
            ConnectionState::Connected => return self.current_handle(),
            ConnectionState::Uninitialized => {}
            ConnectionState::Unconfigured
            | ConnectionState::FailedPermanently
            | ConnectionState::Closed => return None,
        }

        self.attempt().await;
        self.current_handle()
    }

    /// Checks that the store answers a PING.
    ///
    /// `Ok(false)` when the cache is unconfigured or unavailable. A PING error
    /// is returned as-is and moves `Connected` to `FailedPermanently`.
    pub async fn health_check(&self) -> CacheResult<bool> {
        let Some(store) = self.acquire().await else {
            return Ok(false);
        };

        match store.ping().await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.mark_failed(&e);
                Err(e)
            }
        }
    }

    /// Releases the connection. Safe to call more than once.
    ///
    /// The QUIT is best-effort and bounded, so a stuck store cannot hold up
    /// shutdown.
    ///
    /// A manager closed before its first attempt never connects.
    pub async fn close(&self) {
        let released = {
            let mut slot = self.inner.slot.write();
            match slot.state {
                ConnectionState::Connected => {
                    slot.state = ConnectionState::Closed;
                    slot.handle.take()
                }
                ConnectionState::Uninitialized => {
                    slot.state = ConnectionState::Closed;
                    None
                }
                ConnectionState::Unconfigured
                | ConnectionState::FailedPermanently
                | ConnectionState::Closed => None,
            }
        };

        if let Some(store) = released {
            let quit = with_timeout(QUIT_TIMEOUT, || async {
                store.quit().await.map_err(StatsError::from)
            });
            if let Err(e) = quit.await {
                warn!(error = %e, "Cache did not acknowledge QUIT");
            }
            info!("Cache connection closed");
        }
    }

    fn current_handle(&self) -> Option<Arc<dyn CacheStore>> {
        let slot = self.inner.slot.read();
        match slot.state {
            ConnectionState::Connected => slot.handle.clone(),
            _ => None,
        }
    }

    fn attempt(&self) -> Attempt {
        self.inner
            .attempt
            .get_or_init(|| {
                let inner = Arc::clone(&self.inner);
                let watcher = Arc::downgrade(&self.inner);
                let task = tokio::spawn(async move { inner.connect().await });
                async move {
                    if let Err(e) = task.await {
                        error!(error = %e, "Cache connection task did not complete");
                        if let Some(inner) = watcher.upgrade() {
                            inner.settle(ConnectionState::FailedPermanently, None);
                        }
                    }
                }
                .boxed()
                .shared()
            })
            .clone()
    }

    fn mark_failed(&self, err: &CacheError) {
        let released = {
            let mut slot = self.inner.slot.write();
            if slot.state == ConnectionState::Connected {
                slot.state = ConnectionState::FailedPermanently;
                slot.handle.take()
            } else {
                None
            }
        };

        if released.is_some() {
            error!(error = %err, "Cache health check failed, cache disabled for this process");
        }
    }
}

impl Inner {
    async fn connect(&self) {
        let Some(connector) = self.connector.as_ref() else {
            return;
        };

        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let cache_target = connector.target().to_string();
        debug!(cache_target = %cache_target, attempt, "Opening cache connection");

        let result = match race_timeout(self.connect_timeout, connector.connect()).await {
            Race::Completed(result) => result,
            Race::TimedOut => Err(CacheError::Timeout {
                target: cache_target.clone(),
                after: self.connect_timeout,
            }),
        };

        match result {
            Ok(store) => {
                if self.settle(ConnectionState::Connected, Some(Arc::clone(&store))) {
                    info!(cache_target = %cache_target, "Connected to cache");
                } else {
                    debug!("Cache closed while connecting, releasing new connection");
                    if let Err(e) = store.quit().await {
                        debug!(error = %e, "Cache did not acknowledge QUIT");
                    }
                }
            }
            Err(e) => {
                self.settle(ConnectionState::FailedPermanently, None);
                error!(error = %e, "Failed to connect to cache");
            }
        }
    }

    /// Leaves `Uninitialized`. Returns `false` if the state had already moved on.
    fn settle(&self, state: ConnectionState, handle: Option<Arc<dyn CacheStore>>) -> bool {
        let mut slot = self.slot.write();
        if slot.state != ConnectionState::Uninitialized {
            return false;
        }
        slot.state = state;
        slot.handle = handle;
        true
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("target", &self.target())
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryConnector, PingBehavior};
    use futures::future::join_all;

    fn manager_for(connector: &Arc<MemoryConnector>) -> CacheManager {
        CacheManager::new(Arc::clone(connector) as Arc<dyn CacheConnector>, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_unconfigured_never_attempts() {
        let manager = CacheManager::unconfigured();

        for _ in 0..5 {
            assert!(manager.acquire().await.is_none());
        }

        assert_eq!(manager.state(), ConnectionState::Unconfigured);
        assert_eq!(manager.attempts(), 0);
        assert!(!manager.is_configured());
        assert!(manager.target().is_none());
        assert!(!manager.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_from_config_without_host_is_unconfigured() {
        let manager = CacheManager::from_config(&CacheConfig::default());
        assert_eq!(manager.state(), ConnectionState::Unconfigured);
    }

    #[tokio::test]
    async fn test_from_config_with_host_is_lazy() {
        let config = CacheConfig {
            host: Some("cache.invalid".to_string()),
            ..CacheConfig::default()
        };
        let manager = CacheManager::from_config(&config);
        assert_eq!(manager.state(), ConnectionState::Uninitialized);
        assert_eq!(manager.target(), Some("redis://cache.invalid:6379"));
        assert_eq!(manager.attempts(), 0);
    }

    #[tokio::test]
    async fn test_first_acquire_connects_once() {
        let connector = Arc::new(MemoryConnector::new());
        let manager = manager_for(&connector);
        assert_eq!(manager.state(), ConnectionState::Uninitialized);

        assert!(manager.acquire().await.is_some());
        assert!(manager.acquire().await.is_some());

        assert_eq!(manager.state(), ConnectionState::Connected);
        assert_eq!(manager.attempts(), 1);
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_failed_attempt_is_permanent() {
        let connector = Arc::new(MemoryConnector::failing());
        let manager = manager_for(&connector);

        for _ in 0..10 {
            assert!(manager.acquire().await.is_none());
        }

        assert_eq!(manager.state(), ConnectionState::FailedPermanently);
        assert_eq!(manager.attempts(), 1);
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_shares_one_attempt() {
        let connector = Arc::new(MemoryConnector::new().with_delay(Duration::from_millis(50)));
        let manager = manager_for(&connector);

        let callers = (0..32).map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.acquire().await.is_some() })
        });
        let results = join_all(callers).await;

        assert!(results.into_iter().all(|r| r.unwrap()));
        assert_eq!(connector.attempts(), 1);
        assert_eq!(manager.attempts(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_acquire_shares_failure() {
        let connector = Arc::new(MemoryConnector::failing().with_delay(Duration::from_millis(50)));
        let manager = manager_for(&connector);

        let results = join_all((0..8).map(|_| manager.acquire())).await;

        assert!(results.iter().all(Option::is_none));
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_waiter_does_not_cancel_attempt() {
        let connector = Arc::new(MemoryConnector::new().with_delay(Duration::from_secs(1)));
        let manager = manager_for(&connector);

        let early = race_timeout(Duration::from_millis(100), manager.acquire()).await;
        assert!(matches!(early, Race::TimedOut));

        assert!(manager.acquire().await.is_some());
        assert_eq!(connector.attempts(), 1);
        assert_eq!(manager.state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_timeout_counts_as_failed_attempt() {
        let connector = Arc::new(MemoryConnector::new().with_delay(Duration::from_secs(30)));
        let manager = CacheManager::new(
            Arc::clone(&connector) as Arc<dyn CacheConnector>,
            Duration::from_secs(1),
        );

        assert!(manager.acquire().await.is_none());
        assert_eq!(manager.state(), ConnectionState::FailedPermanently);
        assert!(manager.acquire().await.is_none());
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let connector = Arc::new(MemoryConnector::new());
        let manager = manager_for(&connector);
        assert!(manager.acquire().await.is_some());

        manager.close().await;
        manager.close().await;

        assert_eq!(manager.state(), ConnectionState::Closed);
        assert_eq!(connector.store().quit_calls(), 1);
        assert!(manager.acquire().await.is_none());
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_close_before_first_use_prevents_connect() {
        let connector = Arc::new(MemoryConnector::new());
        let manager = manager_for(&connector);

        manager.close().await;

        assert!(manager.acquire().await.is_none());
        assert_eq!(manager.state(), ConnectionState::Closed);
        assert_eq!(connector.attempts(), 0);
    }

    #[tokio::test]
    async fn test_close_after_failure_is_noop() {
        let connector = Arc::new(MemoryConnector::failing());
        let manager = manager_for(&connector);
        assert!(manager.acquire().await.is_none());

        manager.close().await;

        assert_eq!(manager.state(), ConnectionState::FailedPermanently);
        assert_eq!(connector.store().quit_calls(), 0);
    }

    #[tokio::test]
    async fn test_health_check_connected() {
        let connector = Arc::new(MemoryConnector::new());
        let manager = manager_for(&connector);

        assert!(manager.health_check().await.unwrap());
        assert_eq!(manager.state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_failed_ping_disables_without_reconnect() {
        let connector = Arc::new(MemoryConnector::new());
        let manager = manager_for(&connector);
        assert!(manager.acquire().await.is_some());

        connector.store().set_ping(PingBehavior::Fail);
        assert!(manager.health_check().await.is_err());
        assert_eq!(manager.state(), ConnectionState::FailedPermanently);

        connector.store().set_ping(PingBehavior::Ok);
        assert!(!manager.health_check().await.unwrap());
        assert!(manager.acquire().await.is_none());
        assert_eq!(connector.attempts(), 1);
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(ConnectionState::Unconfigured.to_string(), "unconfigured");
        assert_eq!(ConnectionState::FailedPermanently.as_str(), "failed");
    }
}
