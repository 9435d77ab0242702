//! In-process listing cache
//!
//! Used when no Redis URL is configured. Expired entries are dropped lazily on
//! access and by the periodic sweep in `tasks::cleanup`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CacheEntry, CacheError, CacheResult, ListingCache};

#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries,
        }
    }

    /// Removes every expired entry and returns how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl ListingCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut entries = self.entries.lock().await;

        if let Some(existing) = entries.get(key) {
            if !existing.is_expired() {
                return Ok(false);
            }
            entries.remove(key);
        }

        if entries.len() >= self.max_entries {
            entries.retain(|_, entry| !entry.is_expired());
        }
        if entries.len() >= self.max_entries {
            // Make room by dropping whichever live entry expires first
            let soonest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.expires_at)
                .map(|(k, _)| k.clone())
                .ok_or(CacheError::Full)?;
            entries.remove(&soonest);
        }

        entries.insert(key.to_string(), CacheEntry::new(value.to_string(), ttl));
        Ok(true)
    }
}
