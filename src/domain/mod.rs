//! Domain layer: request/response models and the pure caching rules.
//!
//! Nothing in here performs I/O. Key derivation and TTL extraction are plain
//! functions of a [`query::QueryRequest`], which keeps them deterministic and
//! easy to test.
//!
//! # Modules
//!
//! - [`query`] - Query and resource request/response models, integrity gate
//! - [`headers`] - Forwarded header names and canonicalization
//! - [`cache_key`] - Cache key and purge-prefix derivation
//! - [`ttl`] - Caching TTL extraction from the query payload
//! - [`cache_status`] - HIT/MISS/BYPASS/ERROR/DISABLED outcome
//! - [`backend`] - Trait for the data-query backend behind the cache

pub mod backend;
pub mod cache_key;
pub mod cache_status;
pub mod headers;
pub mod query;
pub mod ttl;

pub use backend::{BackendError, QueryBackend};
pub use cache_status::CacheStatus;
pub use query::{
    DataQuery, DataResponse, Field, Frame, IntegrityError, QueryRequest, QueryResponse,
    ResourceRequest, ResourceResponse, TimeRange,
};

#[cfg(test)]
pub use backend::MockQueryBackend;
