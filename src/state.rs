use std::sync::Arc;

use crate::application::services::{CachingService, CachingSettings};
use crate::domain::backend::QueryBackend;
use crate::infrastructure::cache::CacheStore;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub caching: Arc<CachingService>,
    pub backend: Arc<dyn QueryBackend>,
    /// Same store the caching service writes to, kept for health checks.
    pub store: Arc<dyn CacheStore>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CacheStore>,
        backend: Arc<dyn QueryBackend>,
        settings: CachingSettings,
    ) -> Self {
        Self {
            caching: Arc::new(CachingService::new(store.clone(), settings)),
            backend,
            store,
        }
    }
}
