//! Application layer services implementing the caching protocol.
//!
//! This layer combines the pure rules from [`crate::domain`] with the store
//! adapters and codec from [`crate::infrastructure`], and exposes the API the
//! HTTP handlers call.
//!
//! # Available Services
//!
//! - [`services::caching_service::CachingService`] - Query cache lookup and population

pub mod services;
