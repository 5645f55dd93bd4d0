//! Redis-backed cache store.

use crate::{CacheConnector, CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::sync::Arc;
use tracing::debug;

/// Opens multiplexed Redis connections for a single URL.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    url: String,
}

impl RedisConnector {
    /// Create a connector for `redis://host:port`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl CacheConnector for RedisConnector {
    fn target(&self) -> &str {
        &self.url
    }

    async fn connect(&self) -> CacheResult<Arc<dyn CacheStore>> {
        let connection_error = |e: redis::RedisError| CacheError::Connection {
            target: self.url.clone(),
            message: e.to_string(),
        };

        let client = redis::Client::open(self.url.as_str()).map_err(connection_error)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(connection_error)?;

        Ok(Arc::new(RedisStore::new(conn)))
    }
}

/// A single multiplexed Redis connection shared by every request task.
///
/// Commands from concurrent tasks are pipelined over the one socket in
/// submission order.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Wrap an open connection.
    #[must_use]
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.conn.clone();
        let deleted: i64 = conn.del(key).await?;
        Ok(deleted > 0)
    }

    async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis PING reply: {}", reply);
        Ok(())
    }

    async fn quit(&self) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("QUIT").query_async(&mut conn).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_target() {
        let connector = RedisConnector::new("redis://cache:6379");
        assert_eq!(connector.target(), "redis://cache:6379");
    }

    #[tokio::test]
    async fn test_invalid_url_is_connection_error() {
        let connector = RedisConnector::new("not a url");
        let err = connector.connect().await.err().expect("connect should fail");
        assert!(matches!(err, CacheError::Connection { .. }));
    }
}
