//! Cache store trait and error types.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),

    #[error("Cache {operation} timed out after {elapsed:?}")]
    Timeout {
        operation: &'static str,
        elapsed: Duration,
    },
}

/// Result type for store operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Keyed byte-blob store with expiration, shared by all requests.
///
/// Implementations report failures as [`CacheError`]; deciding to fail open is
/// the job of [`crate::application::services::CachingService`]. No locking or
/// request coalescing happens at this level: two concurrent misses on one key
/// produce two writes, and the last one wins.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed store
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process store with expiry
/// - [`crate::infrastructure::cache::NullCache`] - Stores nothing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fetches the bytes stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` when a live entry exists
    /// - `Ok(None)` when it does not
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()>;

    /// Deletes every entry whose key starts with `prefix`.
    ///
    /// Returns the number of entries removed.
    async fn delete_with_prefix(&self, prefix: &str) -> CacheResult<u64>;

    /// Checks if the store is reachable.
    async fn health_check(&self) -> bool;

    /// Short backend label used in logs and health output.
    fn name(&self) -> &'static str;
}
