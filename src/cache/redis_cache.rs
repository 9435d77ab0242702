//! Redis-backed listing cache
//!
//! The connection is opened on first use and shared afterwards, so a gateway
//! whose Redis is down still starts and serves from the store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;
use tracing::info;

use super::{CacheError, CacheResult, ListingCache};

pub struct RedisCache {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
}

impl RedisCache {
    /// Validates `url` without connecting.
    pub fn new(url: &str) -> CacheResult<Self> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
        })
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let manager = ConnectionManager::new(self.client.clone()).await?;
                info!("Connected to Redis listing cache");
                Ok::<_, redis::RedisError>(manager)
            })
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))?;
        Ok(manager.clone())
    }
}

fn command_error(err: redis::RedisError) -> CacheError {
    if err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::Command(err.to_string())
    }
}

/// `EX` takes whole seconds; partial seconds round up.
fn expiry_secs(ttl: Duration) -> u64 {
    (ttl.as_secs_f64().ceil() as u64).max(1)
}

#[async_trait]
impl ListingCache for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(command_error)
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        // SET NX replies OK when written and nil when the key exists
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(expiry_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(command_error)?;
        Ok(reply.is_some())
    }
}
