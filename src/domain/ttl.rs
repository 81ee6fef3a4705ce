//! Per-request caching duration.

use serde_json::Value;
use tracing::warn;

use super::query::QueryRequest;

/// Property-bag field holding the caching duration in seconds.
pub const QUERY_CACHING_TTL_FIELD: &str = "queryCachingTTL";

/// Returns the caching TTL in seconds declared by the request's first query.
///
/// `0.0` means caching is disabled. That is the answer for a request with no
/// queries, a property bag that is not a JSON object, a missing or `null`
/// field, and any value that is not a finite, non-negative number. Unusable
/// values are logged and never turned into request errors.
pub fn query_caching_ttl(request: &QueryRequest) -> f64 {
    let Some(query) = request.first_query() else {
        return 0.0;
    };

    let Some(props) = query.json.as_object() else {
        if !query.json.is_null() {
            warn!(
                ref_id = %query.ref_id,
                "Query properties are not a JSON object, caching disabled"
            );
        }
        return 0.0;
    };

    match props.get(QUERY_CACHING_TTL_FIELD) {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => match n.as_f64() {
            Some(ttl) if ttl.is_finite() && ttl >= 0.0 => ttl,
            _ => {
                warn!(
                    ref_id = %query.ref_id,
                    ttl = %n,
                    "Unusable queryCachingTTL, caching disabled"
                );
                0.0
            }
        },
        Some(other) => {
            warn!(
                ref_id = %query.ref_id,
                ttl = %other,
                "Non-numeric queryCachingTTL, caching disabled"
            );
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{DataQuery, TimeRange};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn request_with(json: Value) -> QueryRequest {
        let range = TimeRange::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap(),
        );
        QueryRequest::new(vec![DataQuery::new("A", range, json)])
    }

    #[test]
    fn test_reads_integer_ttl() {
        assert_eq!(query_caching_ttl(&request_with(json!({ "queryCachingTTL": 60 }))), 60.0);
    }

    #[test]
    fn test_reads_fractional_ttl() {
        assert_eq!(
            query_caching_ttl(&request_with(json!({ "queryCachingTTL": 2.5 }))),
            2.5
        );
    }

    #[test]
    fn test_missing_field_disables_caching() {
        assert_eq!(query_caching_ttl(&request_with(json!({ "expr": "up" }))), 0.0);
        assert_eq!(query_caching_ttl(&request_with(json!({ "queryCachingTTL": null }))), 0.0);
    }

    #[test]
    fn test_malformed_values_disable_caching() {
        assert_eq!(query_caching_ttl(&request_with(json!({ "queryCachingTTL": "60" }))), 0.0);
        assert_eq!(query_caching_ttl(&request_with(json!({ "queryCachingTTL": -5 }))), 0.0);
        assert_eq!(query_caching_ttl(&request_with(json!([1, 2, 3]))), 0.0);
        assert_eq!(query_caching_ttl(&request_with(Value::Null)), 0.0);
    }

    #[test]
    fn test_only_first_query_counts() {
        let mut request = request_with(json!({}));
        let range = request.queries[0].time_range;
        request
            .queries
            .push(DataQuery::new("B", range, json!({ "queryCachingTTL": 300 })));

        assert_eq!(query_caching_ttl(&request), 0.0);
    }

    #[test]
    fn test_no_queries_disables_caching() {
        assert_eq!(query_caching_ttl(&QueryRequest::default()), 0.0);
    }
}
