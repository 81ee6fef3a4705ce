//! In-process store with per-entry expiry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use super::service::{CacheResult, CacheStore};

/// Longest lifetime granted to an in-process entry. Longer TTLs are capped.
const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Clone)]
struct Entry {
    data: Arc<[u8]>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Single-node store backed by a Moka cache.
///
/// Holds at most `max_entries` entries; Moka's TinyLFU policy picks what to
/// evict. Each entry expires after its own TTL, capped at one year.
pub struct MemoryCache {
    cache: Cache<String, Entry>,
}

impl MemoryCache {
    /// Creates a store holding at most `max_entries` entries.
    pub fn new(max_entries: usize) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries.max(1) as u64)
            .expire_after(EntryExpiry)
            .build();

        Self { cache }
    }

    /// Number of live entries, after pending evictions have run.
    pub async fn len(&self) -> usize {
        self.cache.run_pending_tasks().await;
        self.cache.iter().count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Keys of live entries, sorted.
    pub async fn keys(&self) -> Vec<String> {
        self.cache.run_pending_tasks().await;
        let mut keys: Vec<String> = self
            .cache
            .iter()
            .map(|(k, _)| k.as_ref().clone())
            .collect();
        keys.sort();
        keys
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(self.cache.get(key).await.map(|entry| entry.data.to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        if ttl > MAX_TTL {
            debug!(key = %key, ttl_seconds = ttl.as_secs_f64(), "Capping in-process TTL");
        }

        self.cache
            .insert(
                key.to_string(),
                Entry {
                    data: Arc::from(value),
                    ttl: ttl.min(MAX_TTL),
                },
            )
            .await;
        Ok(())
    }

    async fn delete_with_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let matching: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k)
            .collect();

        let mut deleted = 0;
        for key in matching {
            if self.cache.remove(key.as_str()).await.is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = MemoryCache::default();

        cache
            .set("a", b"payload", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get("a").await.unwrap(), Some(b"payload".to_vec()));
        assert_eq!(cache.get("b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = MemoryCache::default();
        cache.set("a", b"x", Duration::from_millis(50)).await.unwrap();
        cache.set("b", b"y", Duration::from_secs(60)).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get("a").await.unwrap().is_none());
        assert!(cache.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_resets_ttl() {
        let cache = MemoryCache::default();
        cache.set("a", b"1", Duration::from_millis(50)).await.unwrap();
        cache.set("a", b"2", Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(cache.get("a").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_huge_ttl_is_capped() {
        let cache = MemoryCache::default();

        cache
            .set("a", b"x", Duration::from_secs_f64(1e19))
            .await
            .unwrap();

        assert_eq!(cache.get("a").await.unwrap(), Some(b"x".to_vec()));
    }

    #[tokio::test]
    async fn test_delete_with_prefix() {
        let cache = MemoryCache::default();
        let ttl = Duration::from_secs(60);
        cache.set("D_DS_7_3_5m0s_a", b"1", ttl).await.unwrap();
        cache.set("D_DS_7_3_1h0m0s_b", b"2", ttl).await.unwrap();
        cache.set("D_DS_7_30_5m0s_c", b"3", ttl).await.unwrap();

        let removed = cache.delete_with_prefix("D_DS_7_3_").await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(cache.get("D_DS_7_3_5m0s_a").await.unwrap(), None);
        assert_eq!(cache.keys().await, vec!["D_DS_7_30_5m0s_c".to_string()]);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let cache = MemoryCache::new(2);
        let ttl = Duration::from_secs(60);
        for key in ["a", "b", "c", "d"] {
            cache.set(key, b"1", ttl).await.unwrap();
        }

        assert!(cache.len().await <= 2);
    }

    #[tokio::test]
    async fn test_overwrite_does_not_grow() {
        let cache = MemoryCache::new(2);
        let ttl = Duration::from_secs(60);
        cache.set("a", b"1", ttl).await.unwrap();
        cache.set("b", b"2", ttl).await.unwrap();

        cache.set("a", b"3", ttl).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await.unwrap(), Some(b"3".to_vec()));
    }
}
