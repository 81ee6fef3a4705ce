//! Store adapters for encoded query responses.
//!
//! Provides a [`CacheStore`] trait with three implementations:
//! - [`RedisCache`] - Production Redis-backed store
//! - [`MemoryCache`] - In-process store for single-node deployments and tests
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{CacheError, CacheResult, CacheStore};

#[cfg(test)]
pub use service::MockCacheStore;
