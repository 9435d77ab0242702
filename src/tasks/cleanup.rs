//! Cache Sweep Task
//!
//! The in-process listing cache only drops expired entries when they are read;
//! this task clears the rest at a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryCache;

/// Spawns the sweep loop. Abort the returned handle on shutdown.
pub fn spawn_cleanup_task(cache: Arc<MemoryCache>, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!("Cache sweep: removed {} expired listings", removed);
            } else {
                debug!("Cache sweep: nothing expired");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ListingCache;

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_expired_listings() {
        let cache = Arc::new(MemoryCache::new(8));
        cache
            .set_if_absent("members", "[]", Duration::from_secs(1))
            .await
            .unwrap();
        cache
            .set_if_absent("students", "[]", Duration::from_secs(3600))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("students").await.unwrap(), Some("[]".to_string()));

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweep_can_be_aborted() {
        let cache = Arc::new(MemoryCache::new(8));
        let handle = spawn_cleanup_task(cache, 1);

        handle.abort();
        let result = handle.await;
        assert!(result.unwrap_err().is_cancelled());
    }
}
