//! Cache-Aside Retriever
//!
//! Wraps the store's full listing with a short-TTL cache keyed by collection
//! name. The cache only ever accelerates reads: every cache failure, timeout or
//! undecodable payload falls through to the store, and failing to populate the
//! cache is logged and dropped. Writes never invalidate an entry, so a listing
//! may be up to one TTL stale after a mutation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheError, CacheResult, ListingCache};
use crate::collections::Collection;
use crate::models::ExternalRecord;
use crate::store::{ListingQuery, RecordStore, StoreResult};

#[derive(Clone)]
pub struct CacheAsideRetriever {
    cache: Option<Arc<dyn ListingCache>>,
    ttl: Duration,
    timeout: Duration,
}

impl CacheAsideRetriever {
    /// `timeout` bounds each cache call; `ttl` is applied to new entries.
    pub fn new(cache: Arc<dyn ListingCache>, ttl: Duration, timeout: Duration) -> Self {
        Self {
            cache: Some(cache),
            ttl,
            timeout,
        }
    }

    /// A retriever that always reads from the store.
    pub fn uncached() -> Self {
        Self {
            cache: None,
            ttl: Duration::ZERO,
            timeout: Duration::ZERO,
        }
    }

    /// Full listing of `collection`, ascending by unique id.
    pub async fn list_records(
        &self,
        store: &dyn RecordStore,
        collection: &Collection,
    ) -> StoreResult<Vec<ExternalRecord>> {
        let cache = match &self.cache {
            Some(cache) if collection.cached => cache,
            _ => return store.query_all(&ListingQuery::for_collection(collection)).await,
        };

        if let Some(records) = self.cached_listing(cache.as_ref(), &collection.name).await {
            debug!("Cache hit for {}", collection.name);
            return Ok(records);
        }

        let records = store
            .query_all(&ListingQuery::for_collection(collection))
            .await?;
        self.populate(cache.as_ref(), &collection.name, &records)
            .await;
        Ok(records)
    }

    async fn cached_listing(
        &self,
        cache: &dyn ListingCache,
        key: &str,
    ) -> Option<Vec<ExternalRecord>> {
        let payload = match self.bounded(cache.get(key)).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Cache miss for {}", key);
                return None;
            }
            Err(e) => {
                warn!("Cache read for {} failed, using store: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(records) => Some(records),
            Err(e) => {
                warn!("Discarding undecodable cache entry for {}: {}", key, e);
                None
            }
        }
    }

    async fn populate(&self, cache: &dyn ListingCache, key: &str, records: &[ExternalRecord]) {
        let payload = match serde_json::to_string(records) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Could not serialize listing for {}: {}", key, e);
                return;
            }
        };

        match self
            .bounded(cache.set_if_absent(key, &payload, self.ttl))
            .await
        {
            Ok(true) => debug!("Cached {} records for {}", records.len(), key),
            Ok(false) => debug!("Cache entry for {} already present", key),
            Err(e) => warn!("Cache write for {} failed: {}", key, e),
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = CacheResult<T>>) -> CacheResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| CacheError::Timeout(self.timeout))?
    }
}
