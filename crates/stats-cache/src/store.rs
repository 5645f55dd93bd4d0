//! Seams between the manager and a concrete cache backend.

use crate::CacheResult;
use async_trait::async_trait;
use std::sync::Arc;

/// An open connection to a key-value cache store.
///
/// Implementations are shared between tasks behind an `Arc`, so every method
/// takes `&self`.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Reads a value. `None` if the key is absent or expired.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Writes a value that expires after `ttl_secs` seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// Removes a key. Returns `true` if it existed.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Round-trips a PING.
    async fn ping(&self) -> CacheResult<()>;

    /// Asks the store to close the connection.
    async fn quit(&self) -> CacheResult<()>;
}

/// Opens connections to a cache store.
#[async_trait]
pub trait CacheConnector: Send + Sync {
    /// Human-readable connection target, used in log lines.
    fn target(&self) -> &str;

    /// Opens a new connection.
    async fn connect(&self) -> CacheResult<Arc<dyn CacheStore>>;
}
