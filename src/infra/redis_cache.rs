//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tokio::time::timeout;

use crate::cache::{CacheBackend, CacheError};

/// Redis-backed cache over a self-reconnecting connection manager.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Open a connection and verify it with `PING`, bounded by `connect_timeout`.
    pub async fn connect(url: &str, connect_timeout: Duration) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(CacheError::backend)?;

        let connect = async {
            let mut manager = ConnectionManager::new(client).await?;
            let _pong: String = redis::cmd("PING").query_async(&mut manager).await?;
            Ok::<_, redis::RedisError>(manager)
        };

        let manager = timeout(connect_timeout, connect)
            .await
            .map_err(|_| CacheError::Timeout {
                op: "connect",
                timeout: connect_timeout,
            })?
            .map_err(CacheError::unavailable)?;

        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        conn.get(key).await.map_err(map_redis_error)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.set_ex(key, value, expiry_seconds(ttl))
            .await
            .map_err(map_redis_error)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.del(key).await.map_err(map_redis_error)
    }
}

fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::unavailable(err)
    } else {
        CacheError::backend(err)
    }
}

/// Whole seconds for `SETEX`, never below one since Redis rejects a zero expiry.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
