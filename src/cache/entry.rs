//! Cache Entry Module

use std::time::Duration;

use tokio::time::Instant;

/// A cached value with its expiry deadline.
///
/// Deadlines use the tokio clock so paused-time tests can step over them.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub expires_at: Instant,
}

impl CacheEntry {
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    /// An entry is expired from the instant its TTL has fully elapsed.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Time left before expiry, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let entry = CacheEntry::new("listing".to_string(), Duration::from_secs(10));
        assert!(!entry.is_expired());

        tokio::time::advance(Duration::from_secs(9)).await;
        assert!(!entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(1));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_expired_immediately() {
        let entry = CacheEntry::new("listing".to_string(), Duration::ZERO);
        assert!(entry.is_expired());
    }
}
