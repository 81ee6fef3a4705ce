//! Cache lookup and population for panel queries.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::cache_key::{cache_key, panel_prefix, purge_prefix};
use crate::domain::cache_status::CacheStatus;
use crate::domain::headers::NO_PANEL_CACHE;
use crate::domain::query::{QueryRequest, QueryResponse, ResourceRequest, ResourceResponse};
use crate::domain::ttl::query_caching_ttl;
use crate::infrastructure::cache::{CacheError, CacheResult, CacheStore};
use crate::infrastructure::codec::{decode_response, encode_response};

/// Limits applied to every store interaction.
#[derive(Debug, Clone)]
pub struct CachingSettings {
    /// Deadline for a single store call. Elapsed calls count as store errors.
    pub store_timeout: Duration,
    /// Encoded entries larger than this are not written.
    pub max_entry_bytes: usize,
}

impl Default for CachingSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(1),
            max_entry_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Store handle that bounds every call by a deadline.
#[derive(Clone)]
struct GuardedStore {
    store: Arc<dyn CacheStore>,
    timeout: Duration,
}

impl GuardedStore {
    async fn guard<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = CacheResult<T>>,
    ) -> CacheResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CacheError::Timeout {
                operation,
                elapsed: self.timeout,
            }),
        }
    }

    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.guard("get", self.store.get(key)).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> CacheResult<()> {
        self.guard("set", self.store.set(key, value, ttl)).await
    }

    async fn delete_with_prefix(&self, prefix: &str) -> CacheResult<u64> {
        self.guard("delete_with_prefix", self.store.delete_with_prefix(prefix))
            .await
    }
}

/// Result of [`CachingService::handle_query_request`].
#[derive(Debug)]
pub struct CachedQueryResponse {
    pub status: CacheStatus,
    /// The decoded entry, present only on a hit.
    pub response: Option<QueryResponse>,
    /// Writes a freshly computed response for this request. Absent when
    /// caching is disabled for the request.
    pub updater: Option<CacheUpdater>,
}

impl CachedQueryResponse {
    pub fn is_hit(&self) -> bool {
        self.status == CacheStatus::Hit
    }

    fn miss(status: CacheStatus, updater: CacheUpdater) -> Self {
        Self {
            status,
            response: None,
            updater: Some(updater),
        }
    }
}

/// Result of [`CachingService::handle_resource_request`].
#[derive(Debug, Default)]
pub struct CachedResourceResponse {
    pub hit: bool,
    pub response: Option<ResourceResponse>,
}

/// What a [`CacheUpdater::update`] call did with the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Written to the store.
    Stored,
    /// Refused by the integrity gate.
    Rejected,
    /// Not written: caching disabled for the request or entry too large.
    Skipped,
    /// Encoding or the store write failed.
    Failed,
}

impl WriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stored => "stored",
            Self::Rejected => "rejected",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        }
    }
}

/// Populates the cache for one request once its response is known.
///
/// Holds its own copy of the originating request, so the key and TTL used for
/// the write are derived from exactly what the lookup saw.
pub struct CacheUpdater {
    store: GuardedStore,
    request: QueryRequest,
    max_entry_bytes: usize,
}

impl fmt::Debug for CacheUpdater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheUpdater")
            .field("panel", &panel_prefix(&self.request.headers))
            .field("queries", &self.request.queries.len())
            .finish_non_exhaustive()
    }
}

impl CacheUpdater {
    /// Validates, encodes and stores `response`.
    ///
    /// Never fails: every reason not to cache is logged and reported through
    /// the returned [`WriteOutcome`].
    pub async fn update(&self, response: &QueryResponse) -> WriteOutcome {
        let outcome = self.store_response(response).await;
        counter!("query_cache_writes_total", "outcome" => outcome.as_str()).increment(1);
        outcome
    }

    async fn store_response(&self, response: &QueryResponse) -> WriteOutcome {
        if let Err(e) = response.check_cacheable() {
            error!(error = %e, "Failed to cache query response");
            return WriteOutcome::Rejected;
        }

        let encoded = match encode_response(response) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(error = %e, "Failed to encode query response for caching");
                return WriteOutcome::Failed;
            }
        };

        if encoded.len() > self.max_entry_bytes {
            warn!(
                bytes = encoded.len(),
                limit = self.max_entry_bytes,
                "Query response too large to cache"
            );
            return WriteOutcome::Skipped;
        }

        let ttl_seconds = query_caching_ttl(&self.request);
        let (Some(query), Ok(ttl)) = (
            self.request.first_query(),
            Duration::try_from_secs_f64(ttl_seconds),
        ) else {
            return WriteOutcome::Skipped;
        };
        if ttl.is_zero() {
            debug!("Caching disabled for request, response not stored");
            return WriteOutcome::Skipped;
        }

        let key = cache_key(&self.request.headers, &query.time_range, ttl_seconds);
        info!(
            key = %key,
            ttl_seconds,
            from = %query.time_range.from,
            to = %query.time_range.to,
            "Caching query response"
        );

        match self.store.set(&key, &encoded, ttl).await {
            Ok(()) => WriteOutcome::Stored,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to cache query response");
                WriteOutcome::Failed
            }
        }
    }
}

/// Decides whether a query can be answered from the cache.
///
/// Every store or codec failure degrades to a miss; nothing here fails the
/// request. There is no request coalescing: concurrent misses on the same key
/// each run the query and each write the result.
pub struct CachingService {
    store: GuardedStore,
    settings: CachingSettings,
}

impl CachingService {
    /// Creates a caching service over `store`.
    pub fn new(store: Arc<dyn CacheStore>, settings: CachingSettings) -> Self {
        Self {
            store: GuardedStore {
                store,
                timeout: settings.store_timeout,
            },
            settings,
        }
    }

    /// Looks up a cached response for `request`.
    ///
    /// # Decision
    ///
    /// 1. No caching TTL: purge the panel's entries, return [`CacheStatus::Disabled`]
    ///    without an updater.
    /// 2. `X-No-Panel-Cache` present: purge, return [`CacheStatus::Bypass`] with an updater.
    /// 3. Store error: [`CacheStatus::Error`] with an updater.
    /// 4. Not found, or entry fails to decode: [`CacheStatus::Miss`] with an updater.
    ///    Undecodable entries are left to expire.
    /// 5. Otherwise [`CacheStatus::Hit`] with the decoded response and an updater.
    #[instrument(skip_all, fields(panel = %panel_prefix(&request.headers)))]
    pub async fn handle_query_request(&self, request: &QueryRequest) -> CachedQueryResponse {
        let cached = self.lookup(request).await;
        counter!("query_cache_requests_total", "status" => cached.status.as_str()).increment(1);
        cached
    }

    /// Resource calls are never cached: always a miss, no updater, no store access.
    pub async fn handle_resource_request(
        &self,
        _request: &ResourceRequest,
    ) -> CachedResourceResponse {
        CachedResourceResponse::default()
    }

    async fn lookup(&self, request: &QueryRequest) -> CachedQueryResponse {
        let ttl_seconds = query_caching_ttl(request);
        let query = match request.first_query() {
            Some(query) if ttl_seconds > 0.0 => query,
            _ => {
                self.purge(request).await;
                return CachedQueryResponse {
                    status: CacheStatus::Disabled,
                    response: None,
                    updater: None,
                };
            }
        };

        if request.has_header(NO_PANEL_CACHE) {
            self.purge(request).await;
            return CachedQueryResponse::miss(CacheStatus::Bypass, self.updater(request));
        }

        let key = cache_key(&request.headers, &query.time_range, ttl_seconds);
        let bytes = match self.store.get(&key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %key, "Cache MISS");
                return CachedQueryResponse::miss(CacheStatus::Miss, self.updater(request));
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed, treating as miss");
                return CachedQueryResponse::miss(CacheStatus::Error, self.updater(request));
            }
        };

        match decode_response(&bytes) {
            Ok(response) => {
                debug!(key = %key, "Cache HIT");
                CachedQueryResponse {
                    status: CacheStatus::Hit,
                    response: Some(response),
                    updater: Some(self.updater(request)),
                }
            }
            Err(e) => {
                error!(key = %key, error = %e, "Failed to decode cached query response");
                CachedQueryResponse::miss(CacheStatus::Miss, self.updater(request))
            }
        }
    }

    async fn purge(&self, request: &QueryRequest) {
        let prefix = purge_prefix(&request.headers);
        match self.store.delete_with_prefix(&prefix).await {
            Ok(deleted) => debug!(prefix = %prefix, deleted, "Purged panel cache"),
            Err(e) => warn!(prefix = %prefix, error = %e, "Failed to purge panel cache"),
        }
    }

    fn updater(&self, request: &QueryRequest) -> CacheUpdater {
        CacheUpdater {
            store: self.store.clone(),
            request: request.clone(),
            max_entry_bytes: self.settings.max_entry_bytes,
        }
    }
}
