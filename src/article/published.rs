use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishedDateError {
    #[error("Published date is missing")]
    Missing,
    #[error("Published date is empty")]
    Empty,
    #[error("Unrecognised published date: {0}")]
    Unrecognised(String),
}

// Offset-less timestamps are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 publication timestamp.
///
/// Accepts RFC 3339 (`Z` or a numeric offset), naive date-times and bare
/// `YYYY-MM-DD` dates, which resolve to midnight UTC.
pub fn parse_published(raw: &str) -> Result<DateTime<Utc>, PublishedDateError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PublishedDateError::Empty);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| PublishedDateError::Unrecognised(raw.to_string()))
}

/// Whole days elapsed between `published` and `now`, truncated.
/// Negative for timestamps in the future.
pub fn age_in_days(published: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - published).num_days()
}
