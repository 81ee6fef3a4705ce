//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod query;
pub mod resource;

pub use health::health_handler;
pub use query::query_handler;
pub use resource::resource_handler;
