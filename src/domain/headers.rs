//! Forwarded request headers understood by the caching layer.
//!
//! Names are in canonical MIME form. The HTTP boundary canonicalizes incoming
//! names before building a [`crate::domain::query::QueryRequest`], so lookups
//! here are plain case-sensitive string comparisons.

/// Dashboard UID, first segment of the cache key prefix.
pub const DASHBOARD_UID: &str = "X-Dashboard-Uid";

/// Data source UID, second segment of the cache key prefix.
pub const DATASOURCE_UID: &str = "X-Datasource-Uid";

/// Organization ID, third segment of the cache key prefix.
pub const ORG_ID: &str = "X-Grafana-Org-Id";

/// Panel ID, fourth segment of the cache key prefix.
pub const PANEL_ID: &str = "X-Panel-Id";

/// Prefix of per-variable headers: `X-Dashboard-Var-Env: prod` binds `Env`.
pub const DASHBOARD_VAR_PREFIX: &str = "X-Dashboard-Var-";

/// Presence (any value) forces a purge of the panel's entries and a fresh query.
pub const NO_PANEL_CACHE: &str = "X-No-Panel-Cache";

/// Response header carrying the [`crate::domain::cache_status::CacheStatus`].
pub const X_CACHE: &str = "X-Cache";

/// Converts a header name to canonical MIME form.
///
/// The first letter and every letter following a hyphen are upper-cased, the
/// rest lower-cased: `x-dashboard-var-env` becomes `X-Dashboard-Var-Env`.
/// Names containing anything other than ASCII letters, digits or `-` are
/// returned unchanged.
pub fn canonical_name(name: &str) -> String {
    let is_token = name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-');
    if !is_token {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}
