//! Outcome of a cache lookup, reported to the HTTP boundary.

use std::fmt;

/// How a query request was served with respect to the cache.
///
/// Carried back to the caller as a value and rendered by the API layer into
/// the `X-Cache` response header. It is meant for observability; control flow
/// depends on the accompanying response and updater instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheStatus {
    /// A stored entry was found and decoded.
    Hit,
    /// No entry, or the stored entry could not be decoded.
    Miss,
    /// The request asked to skip the cache; the panel's entries were purged.
    Bypass,
    /// The store failed while fetching.
    Error,
    /// The request declares no caching TTL; the panel's entries were purged.
    Disabled,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
            Self::Error => "ERROR",
            Self::Disabled => "DISABLED",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_values() {
        let values: Vec<String> = [
            CacheStatus::Hit,
            CacheStatus::Miss,
            CacheStatus::Bypass,
            CacheStatus::Error,
            CacheStatus::Disabled,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();

        assert_eq!(values, ["HIT", "MISS", "BYPASS", "ERROR", "DISABLED"]);
    }
}
