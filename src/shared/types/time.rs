//! Lenient timestamp parsing for backend rows.
//!
//! Rows arrive from the backend as JSON strings in a handful of shapes
//! (`timestamptz`, `timestamp`, `date`). Naive values are read as UTC.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a backend timestamp. Returns `None` for anything unrecognised.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // Postgres renders offsets as "+00" which RFC 3339 rejects.
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Midnight UTC on the first day of `now`'s month.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap_or(now.date_naive());
    Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("2024-01-05T10:30:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-01-05T08:30:00+00:00");
    }

    #[test]
    fn test_parse_postgres_short_offset() {
        let ts = parse_timestamp("2024-01-05 10:30:00+00").unwrap();
        assert_eq!(ts.day(), 5);
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        assert!(parse_timestamp("2024-01-05T10:30:00").is_some());
        assert!(parse_timestamp("2024-01-05T10:30:00.123").is_some());
        let date = parse_timestamp("2024-03-01").unwrap();
        assert_eq!(date.month(), 3);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn test_start_of_month() {
        let now = parse_timestamp("2024-02-17T15:04:05Z").unwrap();
        assert_eq!(start_of_month(now).to_rfc3339(), "2024-02-01T00:00:00+00:00");
    }
}
