//! Conversion of incoming HTTP headers into the forwarded-header map.

use std::collections::HashMap;

use axum::http::HeaderMap;

use crate::domain::headers::canonical_name;

/// Collects request headers under their canonical names.
///
/// Values that are not visible ASCII are dropped. When a header repeats, the
/// first value wins.
pub fn forwarded_headers(headers: &HeaderMap) -> HashMap<String, String> {
    let mut forwarded = HashMap::with_capacity(headers.len());
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            forwarded
                .entry(canonical_name(name.as_str()))
                .or_insert_with(|| value.to_string());
        }
    }
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_names_are_canonicalized() {
        let mut headers = HeaderMap::new();
        headers.insert("x-panel-id", HeaderValue::from_static("3"));
        headers.insert("x-dashboard-var-env", HeaderValue::from_static("prod"));

        let forwarded = forwarded_headers(&headers);

        assert_eq!(forwarded.get("X-Panel-Id"), Some(&"3".to_string()));
        assert_eq!(forwarded.get("X-Dashboard-Var-Env"), Some(&"prod".to_string()));
    }

    #[test]
    fn test_first_value_wins() {
        let mut headers = HeaderMap::new();
        headers.append("x-panel-id", HeaderValue::from_static("3"));
        headers.append("x-panel-id", HeaderValue::from_static("4"));

        assert_eq!(
            forwarded_headers(&headers).get("X-Panel-Id"),
            Some(&"3".to_string())
        );
    }

    #[test]
    fn test_opaque_values_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert("x-panel-id", HeaderValue::from_bytes(b"\xff\xfe").unwrap());

        assert!(forwarded_headers(&headers).is_empty());
    }
}
