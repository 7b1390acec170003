//! HTTP cache validation module
//!
//! Provides `ETag` generation, `Last-Modified` formatting and conditional
//! request evaluation.

use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generate an `ETag` from file metadata
///
/// # Arguments
/// * `len` - File size in bytes
/// * `modified` - Modification time, if the platform reports one
///
/// # Returns
/// Quoted `ETag` string, e.g., `"56273e80-1a2b3c-4d2"` (mtime seconds,
/// mtime nanoseconds, size)
pub fn generate_etag(len: u64, modified: Option<SystemTime>) -> String {
    let since_epoch = modified
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .unwrap_or_default();
    format!(
        "\"{:x}-{:x}-{len:x}\"",
        since_epoch.as_secs(),
        since_epoch.subsec_nanos()
    )
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .any(|e| e.trim() == etag || e.trim() == "*")
    })
}

/// Format a timestamp as an IMF-fixdate (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// `true` when a file modified at `modified` is no newer than the
/// `If-Modified-Since` value. Unparseable dates never match.
pub fn not_modified_since(if_modified_since: &str, modified: SystemTime) -> bool {
    let Ok(since) = DateTime::parse_from_rfc2822(if_modified_since.trim()) else {
        return false;
    };
    // HTTP dates carry whole seconds only
    DateTime::<Utc>::from(modified).timestamp() <= since.timestamp()
}

/// Decide whether a conditional GET can be answered with 304.
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when no entity tag was sent.
pub fn is_not_modified(
    if_none_match: Option<&str>,
    if_modified_since: Option<&str>,
    etag: &str,
    modified: Option<SystemTime>,
) -> bool {
    if if_none_match.is_some() {
        return check_etag_match(if_none_match, etag);
    }
    match (if_modified_since, modified) {
        (Some(since), Some(modified)) => not_modified_since(since, modified),
        _ => false,
    }
}
