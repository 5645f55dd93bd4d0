//! Best-effort get/set/delete over the managed connection.

use crate::{CacheInterface, CacheManager, ConnectionState};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Cache operations for request handlers.
///
/// Every call acquires the shared connection through the [`CacheManager`].
/// When the cache is unconfigured or unavailable, reads miss and writes do
/// nothing. Store errors are logged and absorbed.
#[derive(Debug, Clone)]
pub struct CacheOperations {
    manager: CacheManager,
}

impl CacheOperations {
    /// Create operations backed by `manager`.
    #[must_use]
    pub fn new(manager: CacheManager) -> Self {
        Self { manager }
    }

    /// The underlying connection manager.
    #[must_use]
    pub fn manager(&self) -> &CacheManager {
        &self.manager
    }
}

#[async_trait]
impl CacheInterface for CacheOperations {
    async fn get(&self, key: &str) -> Option<String> {
        let store = self.manager.acquire().await?;

        match store.get(key).await {
            Ok(value) => {
                match &value {
                    Some(_) => debug!("Cache hit for key '{}'", key),
                    None => debug!("Cache miss for key '{}'", key),
                }
                value
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let Some(store) = self.manager.acquire().await else {
            return;
        };

        // SETEX rejects a zero expiry.
        let ttl_secs = ttl_secs.max(1);
        match store.set_ex(key, value, ttl_secs).await {
            Ok(()) => debug!("Cached key '{}' with TTL {}s", key, ttl_secs),
            Err(e) => warn!(key = %key, error = %e, "Cache write failed"),
        }
    }

    async fn delete(&self, key: &str) {
        let Some(store) = self.manager.acquire().await else {
            return;
        };

        match store.delete(key).await {
            Ok(deleted) => debug!("Deleted key '{}': {}", key, deleted),
            Err(e) => warn!(key = %key, error = %e, "Cache delete failed"),
        }
    }

    fn is_enabled(&self) -> bool {
        matches!(
            self.manager.state(),
            ConnectionState::Uninitialized | ConnectionState::Connected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryConnector;
    use crate::{CacheConnector, CacheExt};
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::time::Duration;

    fn ops_for(connector: &Arc<MemoryConnector>) -> CacheOperations {
        CacheOperations::new(CacheManager::new(
            Arc::clone(connector) as Arc<dyn CacheConnector>,
            Duration::from_secs(5),
        ))
    }

    #[tokio::test]
    async fn test_set_then_get_when_connected() {
        let connector = Arc::new(MemoryConnector::new());
        let ops = ops_for(&connector);

        for (key, value, ttl) in [("a", "1", 1), ("card:stats:octocat", "<svg/>", 300), ("", "", 60)] {
            ops.set(key, value, ttl).await;
            assert_eq!(ops.get(key).await.as_deref(), Some(value));
        }
        assert!(ops.is_enabled());
    }

    #[tokio::test]
    async fn test_unconfigured_is_silent_miss() {
        let ops = CacheOperations::new(CacheManager::unconfigured());

        ops.set("k", "v", 60).await;
        assert!(ops.get("k").await.is_none());
        ops.delete("k").await;
        assert!(!ops.is_enabled());
    }

    #[tokio::test]
    async fn test_failed_connection_is_silent_miss() {
        let connector = Arc::new(MemoryConnector::failing());
        let ops = ops_for(&connector);

        ops.set("k", "v", 60).await;
        assert!(ops.get("k").await.is_none());
        ops.delete("k").await;

        assert!(!ops.is_enabled());
        assert_eq!(connector.attempts(), 1);
    }

    #[tokio::test]
    async fn test_delete_then_get_misses() {
        let connector = Arc::new(MemoryConnector::new());
        let ops = ops_for(&connector);

        ops.set("k", "v", 60).await;
        ops.delete("k").await;
        assert!(ops.get("k").await.is_none());

        // Deleting a missing key is fine too.
        ops.delete("k").await;
    }

    #[tokio::test]
    async fn test_store_errors_are_absorbed() {
        let connector = Arc::new(MemoryConnector::new());
        let ops = ops_for(&connector);
        ops.set("k", "v", 60).await;

        connector.store().set_fail_ops(true);
        assert!(ops.get("k").await.is_none());
        ops.set("k", "w", 60).await;
        ops.delete("k").await;

        connector.store().set_fail_ops(false);
        assert_eq!(ops.get("k").await.as_deref(), Some("v"));
        assert_eq!(ops.manager().state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_clamped() {
        let connector = Arc::new(MemoryConnector::new());
        let ops = ops_for(&connector);

        ops.set("k", "v", 0).await;
        assert_eq!(ops.get("k").await.as_deref(), Some("v"));
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Stats {
        stars: u32,
        name: String,
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let connector = Arc::new(MemoryConnector::new());
        let ops = ops_for(&connector);
        let stats = Stats {
            stars: 42,
            name: "octocat".to_string(),
        };

        ops.set_json("stats", &stats, 60).await;
        assert_eq!(ops.get_json::<Stats>("stats").await, Some(stats));

        ops.set("broken", "{not json", 60).await;
        assert!(ops.get_json::<Stats>("broken").await.is_none());
    }

    #[tokio::test]
    async fn test_get_or_compute_caches_success_only() {
        let connector = Arc::new(MemoryConnector::new());
        let ops = ops_for(&connector);

        let failed: Result<u32, &str> = ops.get_or_compute("n", 60, || async { Err("upstream") }).await;
        assert_eq!(failed, Err("upstream"));
        assert!(ops.get("n").await.is_none());

        let first: Result<u32, &str> = ops.get_or_compute("n", 60, || async { Ok(7) }).await;
        let second: Result<u32, &str> = ops.get_or_compute("n", 60, || async { Ok(8) }).await;
        assert_eq!(first, Ok(7));
        assert_eq!(second, Ok(7));
    }

    #[tokio::test]
    async fn test_get_or_compute_without_cache_always_computes() {
        let ops = CacheOperations::new(CacheManager::unconfigured());

        let first: Result<u32, ()> = ops.get_or_compute("n", 60, || async { Ok(1) }).await;
        let second: Result<u32, ()> = ops.get_or_compute("n", 60, || async { Ok(2) }).await;
        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(2));
    }
}
