//! Interface to the data-query backend the cache sits in front of.

use async_trait::async_trait;
use thiserror::Error;

use super::query::{QueryRequest, QueryResponse, ResourceRequest, ResourceResponse};

/// Errors reported by a [`QueryBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend rejected request: {0}")]
    Rejected(String),
}

/// Executes queries and resource calls that the cache could not answer.
///
/// # Implementations
///
/// Provided by the embedding application. Test mocks are available with
/// `cfg(test)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Runs every query in `request`.
    ///
    /// Per-query failures belong in [`crate::domain::query::DataResponse::error`];
    /// an `Err` means the whole request failed.
    async fn query_data(&self, request: &QueryRequest) -> Result<QueryResponse, BackendError>;

    /// Forwards a resource call.
    async fn call_resource(
        &self,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, BackendError>;
}
