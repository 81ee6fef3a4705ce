//! DTOs for the query endpoint.

use serde::Deserialize;

use crate::domain::query::DataQuery;

/// Body of `POST /api/ds/query`.
///
/// ```json
/// {
///   "queries": [
///     {
///       "refId": "A",
///       "timeRange": { "from": "2024-01-01T10:00:00Z", "to": "2024-01-01T10:05:00Z" },
///       "json": { "expr": "up", "queryCachingTTL": 60 }
///     }
///   ]
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct QueryDataBody {
    pub queries: Vec<DataQuery>,
}
