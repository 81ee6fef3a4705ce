//! No-op store for disabled caching.

use std::time::Duration;

use super::service::{CacheResult, CacheStore};
use async_trait::async_trait;
use tracing::debug;

/// A store that keeps nothing.
///
/// Used when Redis is not configured or unreachable at startup. Every lookup
/// is a miss and every write is accepted and dropped, so the service behaves
/// as if the cache were empty.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for NullCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete_with_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        Ok(0)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "null"
    }
}
