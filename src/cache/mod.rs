//! Listing Cache Module
//!
//! Short-lived storage for serialized collection listings. Entries are only
//! ever written with set-if-absent semantics and expire after their TTL; they
//! are never updated or invalidated in place.

mod entry;
mod memory;
mod redis_cache;

#[cfg(test)]
mod property_tests;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use entry::CacheEntry;
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

// == Cache Error ==
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// The backend could not be reached
    #[error("cache connection failed: {0}")]
    Connection(String),

    /// The backend answered with an error
    #[error("cache command failed: {0}")]
    Command(String),

    #[error("cache call timed out after {0:?}")]
    Timeout(Duration),

    /// No room for a new entry
    #[error("cache is full")]
    Full,
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == Listing Cache Trait ==
#[async_trait]
pub trait ListingCache: Send + Sync {
    /// Returns the live value stored under `key`, if any.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Stores `value` under `key` for `ttl` unless a live value is already
    /// present. Returns whether the write happened.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;
}
