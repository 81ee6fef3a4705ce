//! # Panel Query Cache
//!
//! A response cache for dashboard panel queries, sitting in front of a
//! data-query backend and storing gzip-compressed results in Redis.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Request/response models, key derivation, TTL extraction
//! - **Application Layer** ([`application`]) - The caching decision engine
//! - **Infrastructure Layer** ([`infrastructure`]) - Store adapters, entry codec, upstream client
//! - **API Layer** ([`api`]) - Axum handlers, DTOs, and middleware
//!
//! ## Request flow
//!
//! Each `POST /api/ds/query` is keyed by dashboard, datasource, org, panel,
//! dashboard variables, range length and a TTL-aligned time bucket. A hit is
//! served from the store; otherwise the backend runs the query and a clean
//! result is written back. Every response carries an `X-Cache` header
//! (`HIT`, `MISS`, `BYPASS`, `ERROR`, `DISABLED`). Store failures never fail a
//! request.
//!
//! ## Quick Start
//!
//! ```bash
//! export BACKEND_URL="http://grafana:3000"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{
        CacheUpdater, CachedQueryResponse, CachingService, CachingSettings, WriteOutcome,
    };
    pub use crate::domain::{
        BackendError, CacheStatus, DataQuery, DataResponse, Field, Frame, QueryBackend,
        QueryRequest, QueryResponse, ResourceRequest, ResourceResponse, TimeRange,
    };
    pub use crate::error::AppError;
    pub use crate::infrastructure::cache::{CacheStore, MemoryCache, NullCache};
    pub use crate::state::AppState;
}
