//! Cache key derivation for panel queries.
//!
//! A key has the shape
//!
//! ```text
//! {dashboard}_{datasource}_{org}_{panel}_{Var:value_}...{period}_{bucket}
//! ```
//!
//! - the first four segments form the *panel prefix* used for bulk purges;
//! - dashboard variables are sorted by name so header order never matters;
//! - `period` is the range length rounded to the minute (`5m0s`);
//! - `bucket` is the range start truncated to a TTL-sized boundary, so keys
//!   roll over as time advances and stale entries simply stop being read.
//!
//! All functions are pure and total: missing headers yield empty segments and
//! a zero or negative TTL leaves the start time untruncated.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

use super::headers::{DASHBOARD_UID, DASHBOARD_VAR_PREFIX, DATASOURCE_UID, ORG_ID, PANEL_ID};
use super::query::TimeRange;

const NANOS_PER_SECOND: i128 = 1_000_000_000;
const MILLIS_PER_MINUTE: u64 = 60_000;

fn header<'a>(headers: &'a HashMap<String, String>, name: &str) -> &'a str {
    headers.get(name).map(String::as_str).unwrap_or_default()
}

/// Identity-only part of a key: dashboard, datasource, org and panel.
pub fn panel_prefix(headers: &HashMap<String, String>) -> String {
    format!(
        "{}_{}_{}_{}",
        header(headers, DASHBOARD_UID),
        header(headers, DATASOURCE_UID),
        header(headers, ORG_ID),
        header(headers, PANEL_ID),
    )
}

/// Prefix passed to the store when purging one panel's entries.
///
/// Includes the separator after the panel id so purging panel `3` leaves
/// panel `30` alone.
pub fn purge_prefix(headers: &HashMap<String, String>) -> String {
    format!("{}_", panel_prefix(headers))
}

/// `Name:value_` for every dashboard-variable header, sorted by header name.
pub fn dashboard_variables(headers: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = headers
        .keys()
        .filter(|name| name.starts_with(DASHBOARD_VAR_PREFIX))
        .collect();
    names.sort();

    names
        .into_iter()
        .map(|name| {
            format!(
                "{}:{}_",
                &name[DASHBOARD_VAR_PREFIX.len()..],
                header(headers, name)
            )
        })
        .collect()
}

/// Renders a range length rounded to the nearest minute.
///
/// Halfway values round away from zero. Output looks like `0s`, `5m0s`,
/// `1h30m0s` or `-2m0s`.
pub fn format_period(span: TimeDelta) -> String {
    let millis = span.num_milliseconds();
    let minutes = (millis.unsigned_abs() + MILLIS_PER_MINUTE / 2) / MILLIS_PER_MINUTE;

    if minutes == 0 {
        return "0s".to_string();
    }

    let sign = if millis < 0 { "-" } else { "" };
    let (hours, minutes) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{sign}{hours}h{minutes}m0s")
    } else {
        format!("{sign}{minutes}m0s")
    }
}

/// Truncates `start` down to a multiple of `ttl_seconds` since the Unix epoch.
///
/// Fractional TTLs are honored to the nanosecond. A TTL that is zero,
/// negative or not a number returns `start` unchanged.
///
/// Buckets are aligned to the Unix epoch on purpose, not to year 1. For a
/// TTL that does not divide the offset between the two, bucket boundaries
/// (and so keys) differ from a zero-time truncation.
pub fn time_bucket(start: DateTime<Utc>, ttl_seconds: f64) -> DateTime<Utc> {
    let step = (ttl_seconds * NANOS_PER_SECOND as f64) as i128;
    if step <= 0 {
        return start;
    }

    let nanos = i128::from(start.timestamp()) * NANOS_PER_SECOND
        + i128::from(start.timestamp_subsec_nanos());
    let bucket = nanos - nanos.rem_euclid(step);

    let secs = i64::try_from(bucket.div_euclid(NANOS_PER_SECOND)).ok();
    let subsec = bucket.rem_euclid(NANOS_PER_SECOND) as u32;

    secs.and_then(|s| DateTime::from_timestamp(s, subsec))
        .unwrap_or(start)
}

/// Full cache key for a query over `range` cached for `ttl_seconds`.
pub fn cache_key(
    headers: &HashMap<String, String>,
    range: &TimeRange,
    ttl_seconds: f64,
) -> String {
    let bucket =
        time_bucket(range.from, ttl_seconds).to_rfc3339_opts(SecondsFormat::AutoSi, true);

    format!(
        "{}_{}{}_{}",
        panel_prefix(headers),
        dashboard_variables(headers),
        format_period(range.span()),
        bucket
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    fn panel_headers() -> HashMap<String, String> {
        HashMap::from([
            (DASHBOARD_UID.to_string(), "D".to_string()),
            (DATASOURCE_UID.to_string(), "DS".to_string()),
            (ORG_ID.to_string(), "7".to_string()),
            (PANEL_ID.to_string(), "3".to_string()),
        ])
    }

    #[test]
    fn test_panel_prefix() {
        assert_eq!(panel_prefix(&panel_headers()), "D_DS_7_3");
        assert_eq!(purge_prefix(&panel_headers()), "D_DS_7_3_");
    }

    #[test]
    fn test_panel_prefix_with_missing_headers() {
        let headers = HashMap::from([(PANEL_ID.to_string(), "3".to_string())]);

        assert_eq!(panel_prefix(&headers), "___3");
        assert_eq!(panel_prefix(&HashMap::new()), "___");
    }

    #[test]
    fn test_key_for_five_minute_range() {
        let range = TimeRange::new(at(10, 0, 0), at(10, 5, 0));

        let key = cache_key(&panel_headers(), &range, 60.0);

        assert_eq!(key, "D_DS_7_3_5m0s_2024-01-01T10:00:00Z");
    }

    #[test]
    fn test_start_times_in_one_window_share_a_key() {
        let early = TimeRange::new(at(10, 0, 5), at(10, 5, 5));
        let late = TimeRange::new(at(10, 0, 55), at(10, 5, 55));
        let next = TimeRange::new(at(10, 1, 0), at(10, 6, 0));

        let headers = panel_headers();

        assert_eq!(
            cache_key(&headers, &early, 60.0),
            cache_key(&headers, &late, 60.0)
        );
        assert_ne!(
            cache_key(&headers, &early, 60.0),
            cache_key(&headers, &next, 60.0)
        );
        assert!(cache_key(&headers, &late, 60.0).ends_with("_2024-01-01T10:00:00Z"));
    }

    #[test]
    fn test_variables_sorted_regardless_of_insertion_order() {
        let range = TimeRange::new(at(10, 0, 0), at(10, 5, 0));

        let mut forward = panel_headers();
        forward.insert("X-Dashboard-Var-Env".to_string(), "prod".to_string());
        forward.insert("X-Dashboard-Var-Region".to_string(), "us".to_string());

        let mut backward = panel_headers();
        backward.insert("X-Dashboard-Var-Region".to_string(), "us".to_string());
        backward.insert("X-Dashboard-Var-Env".to_string(), "prod".to_string());

        let key = cache_key(&forward, &range, 60.0);

        assert_eq!(key, cache_key(&backward, &range, 60.0));
        assert_eq!(key, "D_DS_7_3_Env:prod_Region:us_5m0s_2024-01-01T10:00:00Z");
    }

    #[test]
    fn test_non_variable_headers_ignored() {
        let range = TimeRange::new(at(10, 0, 0), at(10, 5, 0));
        let mut headers = panel_headers();
        headers.insert("X-Dashboard-Variant".to_string(), "nope".to_string());
        headers.insert("Accept".to_string(), "application/json".to_string());

        assert_eq!(
            cache_key(&headers, &range, 60.0),
            cache_key(&panel_headers(), &range, 60.0)
        );
    }

    #[test]
    fn test_format_period() {
        assert_eq!(format_period(TimeDelta::zero()), "0s");
        assert_eq!(format_period(TimeDelta::seconds(29)), "0s");
        assert_eq!(format_period(TimeDelta::seconds(30)), "1m0s");
        assert_eq!(format_period(TimeDelta::minutes(5)), "5m0s");
        assert_eq!(format_period(TimeDelta::seconds(5 * 60 + 29)), "5m0s");
        assert_eq!(format_period(TimeDelta::minutes(60)), "1h0m0s");
        assert_eq!(format_period(TimeDelta::minutes(90)), "1h30m0s");
        assert_eq!(format_period(TimeDelta::days(1)), "24h0m0s");
        assert_eq!(format_period(TimeDelta::minutes(-2)), "-2m0s");
    }

    #[test]
    fn test_time_bucket_zero_ttl_is_identity() {
        let start = at(10, 3, 17);

        assert_eq!(time_bucket(start, 0.0), start);
        assert_eq!(time_bucket(start, -5.0), start);
        assert_eq!(time_bucket(start, f64::NAN), start);
    }

    #[test]
    fn test_time_bucket_fractional_ttl() {
        let start = at(10, 0, 0) + TimeDelta::milliseconds(1_700);

        let bucket = time_bucket(start, 0.5);

        assert_eq!(bucket, at(10, 0, 1) + TimeDelta::milliseconds(500));
    }

    #[test]
    fn test_time_bucket_hour_boundary() {
        assert_eq!(time_bucket(at(10, 59, 59), 3600.0), at(10, 0, 0));
    }

    #[test]
    fn test_time_bucket_before_epoch() {
        let start = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 30).unwrap();

        assert_eq!(
            time_bucket(start, 60.0),
            Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 0).unwrap()
        );
    }

    #[test]
    fn test_time_bucket_is_epoch_aligned() {
        let start = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 10).unwrap();

        assert_eq!(
            time_bucket(start, 7.0),
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 7).unwrap()
        );
    }

    #[test]
    fn test_zero_ttl_key_does_not_panic() {
        let range = TimeRange::new(at(10, 0, 7), at(10, 5, 7));

        let key = cache_key(&HashMap::new(), &range, 0.0);

        assert_eq!(key, "____5m0s_2024-01-01T10:00:07Z");
    }
}
