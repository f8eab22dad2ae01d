//! Timestamp utilities

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Anchor instant for synthesized upload times.
///
/// Rows with no storage metadata and no `created_at` are placed `id` seconds
/// after this instant, so they sort before any real upload and among
/// themselves by ascending id.
pub const FALLBACK_EPOCH_SECS: i64 = 1_609_459_200; // 2021-01-01T00:00:00Z

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Synthesized upload instant for a painting id
pub fn fallback_instant(id: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(FALLBACK_EPOCH_SECS.saturating_add(id), 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Parse an RFC 3339 timestamp into UTC
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a timestamp as stored in a `created_at` column
///
/// Accepts RFC 3339, SQLite's `CURRENT_TIMESTAMP` text (UTC, optional
/// fraction, space or `T` separator) and Postgres text output with a short
/// offset such as `+00`.
pub fn parse_stored_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Some(parsed) = parse_rfc3339(value) {
        return Some(parsed);
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_fallback_epoch_is_2021() {
        let epoch = fallback_instant(0);
        assert_eq!(epoch.to_rfc3339(), "2021-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_fallback_instant_strictly_increasing() {
        assert!(fallback_instant(5) < fallback_instant(9));
        assert!(fallback_instant(59) < fallback_instant(60));
        assert_eq!(
            (fallback_instant(9) - fallback_instant(5)).num_seconds(),
            4
        );
    }

    #[test]
    fn test_fallback_instant_large_id_does_not_wrap() {
        // Ids beyond a minute's worth of seconds keep counting forward
        let t = fallback_instant(3_600);
        assert_eq!(t.to_rfc3339(), "2021-01-01T01:00:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_normalizes_offset() {
        let parsed = parse_rfc3339("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339_rejects_garbage() {
        assert!(parse_rfc3339("yesterday").is_none());
        assert!(parse_rfc3339("").is_none());
    }

    #[test]
    fn test_parse_stored_timestamp_sqlite_text() {
        let parsed = parse_stored_timestamp("2021-03-04 05:06:07").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2021-03-04T05:06:07+00:00");

        let fractional = parse_stored_timestamp("2021-03-04 05:06:07.250").unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_stored_timestamp_postgres_text() {
        let parsed = parse_stored_timestamp("2021-03-04 05:06:07.123456+00").unwrap();
        assert_eq!(parsed.timestamp(), parse_stored_timestamp("2021-03-04 05:06:07").unwrap().timestamp());

        let shifted = parse_stored_timestamp("2021-03-04 07:06:07+02").unwrap();
        assert_eq!(shifted.to_rfc3339(), "2021-03-04T05:06:07+00:00");
    }

    #[test]
    fn test_parse_stored_timestamp_rejects_garbage() {
        assert!(parse_stored_timestamp("garbage").is_none());
        assert!(parse_stored_timestamp("2021-13-45 99:00:00").is_none());
        assert!(parse_stored_timestamp("").is_none());
    }
}
