//! # Stats Cache
//!
//! Optional, best-effort caching for the readme-stats server.
//!
//! The [`CacheManager`] owns the single connection to the external cache
//! store. It connects lazily, makes at most one connection attempt per
//! process, and never reports a connection failure to its callers.
//! [`CacheOperations`] layers get/set/delete on top of it; every operation
//! degrades to a miss or a no-op when the cache is absent or failing.

mod cache_interface;
mod error;
mod manager;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
mod operations;
mod redis_store;
mod store;

pub use cache_interface::{CacheExt, CacheInterface};
pub use error::{CacheError, CacheResult};
pub use manager::{CacheManager, ConnectionState};
pub use operations::CacheOperations;
pub use redis_store::{RedisConnector, RedisStore};
pub use store::{CacheConnector, CacheStore};
