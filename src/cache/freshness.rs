//! Freshness decisions over cached and remote response headers.
//!
//! Two independent checks drive the retrieval state machine:
//!
//! - **expiry** — the cached entry's own `Expires` header against the
//!   current time. A response is fresh only while `now` precedes its
//!   `Expires` timestamp; a missing or unparseable header counts as the
//!   Unix epoch and the entry is therefore expired.
//! - **staleness** — the cached `Last-Modified` against the remote's.
//!   Cached data is fresh iff its timestamp is at least the remote's, with
//!   missing headers again defaulting to the epoch on either side.
//!
//! Both checks are pure and never fail: bad input degrades to the epoch.

use std::collections::BTreeMap;
use std::time::SystemTime;

use super::store::CachedResponse;

/// Parses an RFC 7231 HTTP-date header, defaulting to the Unix epoch.
#[must_use]
pub fn header_date(headers: &BTreeMap<String, String>, name: &str) -> SystemTime {
    headers
        .get(&name.to_ascii_lowercase())
        .and_then(|value| httpdate::parse_http_date(value).ok())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Returns whether a cached response has passed its `Expires` timestamp.
///
/// `now < expires` means not expired; an absent `Expires` header means the
/// entry is always expired.
#[must_use]
pub fn is_expired(cached: &CachedResponse, now: SystemTime) -> bool {
    let expires = header_date(&cached.headers, "expires");
    now >= expires
}

/// Returns whether a cached response is at least as recent as the remote.
///
/// Compares `Last-Modified` on both sides; equal timestamps count as fresh,
/// so an unchanged remote never forces a refetch.
#[must_use]
pub fn is_fresh(cached: &CachedResponse, remote_headers: &BTreeMap<String, String>) -> bool {
    let cached_modified = header_date(&cached.headers, "last-modified");
    let remote_modified = header_date(remote_headers, "last-modified");
    cached_modified >= remote_modified
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    const T1: &str = "Tue, 01 Aug 2023 00:00:00 GMT";
    const T2: &str = "Wed, 02 Aug 2023 00:00:00 GMT";

    fn response_with(headers: &[(&str, &str)]) -> CachedResponse {
        CachedResponse::new(json!(null), headers.iter().map(|&(k, v)| (k, v.to_string())))
    }

    fn remote_headers(headers: &[(&str, &str)]) -> BTreeMap<String, String> {
        headers
            .iter()
            .map(|&(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_header_date_missing_is_epoch() {
        let headers = remote_headers(&[]);
        assert_eq!(header_date(&headers, "expires"), SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_header_date_unparseable_is_epoch() {
        let headers = remote_headers(&[("expires", "soon")]);
        assert_eq!(header_date(&headers, "expires"), SystemTime::UNIX_EPOCH);
    }

    #[test]
    fn test_is_expired_future_expires_is_fresh() {
        let cached = response_with(&[("expires", T2)]);
        let now = httpdate::parse_http_date(T1).unwrap();
        assert!(!is_expired(&cached, now));
    }

    #[test]
    fn test_is_expired_past_expires() {
        let cached = response_with(&[("expires", T1)]);
        let now = httpdate::parse_http_date(T2).unwrap();
        assert!(is_expired(&cached, now));
    }

    #[test]
    fn test_is_expired_missing_header_is_always_expired() {
        let cached = response_with(&[]);
        assert!(is_expired(&cached, SystemTime::UNIX_EPOCH));
        assert!(is_expired(&cached, SystemTime::now()));
    }

    #[test]
    fn test_is_expired_exactly_at_expires_is_expired() {
        let cached = response_with(&[("expires", T1)]);
        let at = httpdate::parse_http_date(T1).unwrap();
        assert!(is_expired(&cached, at));
        assert!(!is_expired(&cached, at - Duration::from_secs(1)));
    }

    #[test]
    fn test_is_fresh_equal_last_modified() {
        let cached = response_with(&[("last-modified", T1)]);
        assert!(is_fresh(&cached, &remote_headers(&[("last-modified", T1)])));
    }

    #[test]
    fn test_is_fresh_remote_newer_is_stale() {
        let cached = response_with(&[("last-modified", T1)]);
        assert!(!is_fresh(&cached, &remote_headers(&[("last-modified", T2)])));
    }

    #[test]
    fn test_is_fresh_cached_newer() {
        let cached = response_with(&[("last-modified", T2)]);
        assert!(is_fresh(&cached, &remote_headers(&[("last-modified", T1)])));
    }

    #[test]
    fn test_is_fresh_missing_both_headers_is_fresh() {
        // Both sides degrade to the epoch, and epoch >= epoch.
        let cached = response_with(&[]);
        assert!(is_fresh(&cached, &remote_headers(&[])));
    }

    #[test]
    fn test_is_fresh_missing_cached_header_is_stale() {
        let cached = response_with(&[]);
        assert!(!is_fresh(&cached, &remote_headers(&[("last-modified", T1)])));
    }
}
