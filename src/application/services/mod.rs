//! Business logic services for the application layer.

pub mod caching_service;

pub use caching_service::{
    CacheUpdater, CachedQueryResponse, CachedResourceResponse, CachingService, CachingSettings,
    WriteOutcome,
};
