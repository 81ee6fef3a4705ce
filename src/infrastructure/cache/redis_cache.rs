//! Redis-backed store implementation.

use std::time::Duration;

use super::service::{CacheError, CacheResult, CacheStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Keys fetched per `SCAN` round trip during prefix deletion.
const SCAN_BATCH: usize = 500;

/// Redis store for encoded query responses.
///
/// Uses connection pooling via `ConnectionManager` for efficient connection reuse.
/// Every key is stored under `key_namespace` so prefix purges never touch data
/// owned by other applications sharing the database. Errors are returned to the
/// caller rather than swallowed here.
pub struct RedisCache {
    client: ConnectionManager,
    key_namespace: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `key_namespace` - Prefix applied to every key; controlled via
    ///   `CACHE_KEY_NAMESPACE`
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING health check fails.
    pub async fn connect(redis_url: &str, key_namespace: &str) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            key_namespace: key_namespace.to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_namespace, key)
    }

    /// `SCAN MATCH` pattern selecting every namespaced key starting with `prefix`.
    fn prefix_pattern(&self, prefix: &str) -> String {
        format!("{}*", escape_glob(&self.build_key(prefix)))
    }
}

/// Escapes Redis glob metacharacters so `value` matches only itself.
fn escape_glob(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Whole seconds for `SET EX`, rounded up and never zero.
fn expiry_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
    secs.max(1)
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<Vec<u8>>>(&full_key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", full_key, e)))?;

        debug!(
            key = %full_key,
            found = value.is_some(),
            "Redis GET"
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();
        let ttl_seconds = expiry_seconds(ttl);

        conn.set_ex::<_, _, ()>(&full_key, value, ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", full_key, e)))?;

        debug!(
            key = %full_key,
            bytes = value.len(),
            ttl_seconds,
            "Redis SET"
        );
        Ok(())
    }

    async fn delete_with_prefix(&self, prefix: &str) -> CacheResult<u64> {
        let pattern = self.prefix_pattern(prefix);
        let mut conn = self.client.clone();
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::OperationError(format!("SCAN {}: {}", pattern, e)))?;

            if !keys.is_empty() {
                let removed: u64 = conn
                    .del(&keys)
                    .await
                    .map_err(|e| CacheError::OperationError(format!("DEL: {}", e)))?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        if deleted > 0 {
            debug!(pattern = %pattern, deleted, "Redis prefix delete");
        }
        Ok(deleted)
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
