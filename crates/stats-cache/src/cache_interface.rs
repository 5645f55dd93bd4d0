//! Cache interface trait for best-effort caching.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::warn;

/// Best-effort string cache.
///
/// None of these methods report failure. A missing, unreachable or failing
/// cache reads as a miss and writes as a no-op, so callers can always fall
/// back to computing the value themselves.
#[async_trait]
pub trait CacheInterface: Send + Sync {
    /// Get a cached value. `None` on miss or when the cache is unavailable.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl_secs` seconds.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64);

    /// Remove `key`. Missing keys are not an error.
    async fn delete(&self, key: &str);

    /// Returns `true` while the cache may still serve requests.
    fn is_enabled(&self) -> bool;
}

/// Typed helpers over [`CacheInterface`] using JSON encoding.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get and decode a cached value. Undecodable entries read as a miss.
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Encode and store a value.
    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T, ttl_secs: u64) {
        match serde_json::to_string(value) {
            Ok(json) => self.set(key, &json, ttl_secs).await,
            Err(e) => warn!(key = %key, error = %e, "Could not encode value for cache"),
        }
    }

    /// Return the cached value, or compute it with `factory` and cache the result.
    ///
    /// Errors from `factory` are returned and nothing is cached.
    async fn get_or_compute<T, E, F, Fut>(&self, key: &str, ttl_secs: u64, factory: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        E: Send,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, E>> + Send,
    {
        if let Some(cached) = self.get_json::<T>(key).await {
            return Ok(cached);
        }

        let value = factory().await?;
        self.set_json(key, &value, ttl_secs).await;
        Ok(value)
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}
