//! In-memory cache backend with failure injection.
//!
//! Expiry follows the tokio clock, so tests running with a paused clock can
//! advance past a TTL deterministically.

use crate::{CacheConnector, CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// How [`MemoryStore::ping`] behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PingBehavior {
    /// Answer immediately.
    #[default]
    Ok,
    /// Return a store error.
    Fail,
    /// Never resolve.
    Hang,
}

struct Entry {
    value: String,
    expires_at: Instant,
}

/// A TTL-aware key-value map behind the [`CacheStore`] trait.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
    fail_ops: AtomicBool,
    ping: Mutex<PingBehavior>,
    quit_calls: AtomicU32,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make get/set/delete return store errors.
    pub fn set_fail_ops(&self, fail: bool) {
        self.fail_ops.store(fail, Ordering::SeqCst);
    }

    /// Change how PING behaves.
    pub fn set_ping(&self, behavior: PingBehavior) {
        *self.ping.lock() = behavior;
    }

    /// Number of QUIT commands received.
    #[must_use]
    pub fn quit_calls(&self) -> u32 {
        self.quit_calls.load(Ordering::SeqCst)
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Returns `true` if no live entries remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_ops(&self, op: &str) -> CacheResult<()> {
        if self.fail_ops.load(Ordering::SeqCst) {
            return Err(CacheError::Store(format!("injected {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_ops("GET")?;
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        self.check_ops("SETEX")?;
        if ttl_secs == 0 {
            return Err(CacheError::Store("invalid expire time in 'setex' command".to_string()));
        }
        self.entries.lock().insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_secs),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        self.check_ops("DEL")?;
        Ok(self.entries.lock().remove(key).is_some())
    }

    async fn ping(&self) -> CacheResult<()> {
        let behavior = *self.ping.lock();
        match behavior {
            PingBehavior::Ok => Ok(()),
            PingBehavior::Fail => Err(CacheError::Store("injected PING failure".to_string())),
            PingBehavior::Hang => std::future::pending().await,
        }
    }

    async fn quit(&self) -> CacheResult<()> {
        self.quit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out one shared [`MemoryStore`], counting connection attempts.
pub struct MemoryConnector {
    store: Arc<MemoryStore>,
    fail: bool,
    delay: Duration,
    attempts: AtomicU32,
}

impl MemoryConnector {
    /// A connector whose attempts succeed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            fail: false,
            delay: Duration::ZERO,
            attempts: AtomicU32::new(0),
        }
    }

    /// A connector whose attempts fail with a connection error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Delay every attempt by `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The store handed to successful attempts.
    #[must_use]
    pub fn store(&self) -> Arc<MemoryStore> {
        Arc::clone(&self.store)
    }

    /// Number of `connect` calls so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MemoryConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheConnector for MemoryConnector {
    fn target(&self) -> &str {
        "memory://local"
    }

    async fn connect(&self) -> CacheResult<Arc<dyn CacheStore>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail {
            return Err(CacheError::Connection {
                target: self.target().to_string(),
                message: "connection refused".to_string(),
            });
        }

        Ok(Arc::clone(&self.store) as Arc<dyn CacheStore>)
    }
}
