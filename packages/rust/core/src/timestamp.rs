//! Unix-seconds → RFC 3339 normalization.
//!
//! `0` is the "unknown time" sentinel: it renders as an empty string, never
//! as `1970-01-01T00:00:00Z`. Unparseable input collapses to the sentinel.

use chrono::{DateTime, Datelike, SecondsFormat};
use tracing::warn;

/// Parse a decimal Unix timestamp, returning `0` on any failure.
///
/// Malformed non-empty input is logged; the result is still `0`.
pub fn parse_unix(raw: &str) -> i64 {
    match raw.parse::<i64>() {
        Ok(secs) => secs,
        Err(e) => {
            if !raw.is_empty() {
                warn!(raw, error = %e, "unparseable timestamp, treating as unknown");
            }
            0
        }
    }
}

/// Format epoch seconds as `YYYY-MM-DDTHH:MM:SSZ` in UTC, or `""` for `0`.
///
/// Instants whose year does not fit in four digits also render as `""`.
pub fn to_canonical(secs: i64) -> String {
    if secs == 0 {
        return String::new();
    }
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) if (0..=9999).contains(&dt.year()) => {
            dt.to_rfc3339_opts(SecondsFormat::Secs, true)
        }
        _ => {
            warn!(secs, "timestamp out of range, treating as unknown");
            String::new()
        }
    }
}

/// [`parse_unix`] followed by [`to_canonical`].
pub fn normalize(raw: &str) -> String {
    to_canonical(parse_unix(raw))
}
