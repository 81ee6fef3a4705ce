//! HTTP boundary of the query cache.
//!
//! Translates requests into [`crate::domain::query`] types, runs them through
//! the caching service and the configured backend, and renders the results.
//!
//! # Modules
//!
//! - [`dto`] - Request/response bodies
//! - [`forwarded`] - Header canonicalization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod forwarded;
pub mod handlers;
pub mod middleware;
pub mod routes;
