//! Lenient parsing of scraped numbers and dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use ipo_core::{RawScalar, TimestampMs};

/// Date-time layouts accepted without an offset; interpreted as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts; resolved to 00:00 UTC.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
];

/// Parse a number written with arbitrary grouping separators.
///
/// Every character other than an ASCII digit, `.` or `-` is dropped before
/// parsing, so `"3,63,53,276"`, `"₹ 1,234.50"` and `"36 353 276"` all parse.
/// Returns `None` for missing input, unparseable text and non-finite results.
pub fn parse_locale_number(input: Option<&str>) -> Option<f64> {
    let cleaned: String = input?
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric value of a raw feed field.
pub fn scalar_number(scalar: Option<&RawScalar>) -> Option<f64> {
    match scalar? {
        RawScalar::Number(n) => Some(*n).filter(|v| v.is_finite()),
        RawScalar::Text(s) => parse_locale_number(Some(s.as_str())),
        RawScalar::Flag(_) => None,
    }
}

/// Parse a feed date into milliseconds since the Unix epoch.
///
/// Accepts RFC 3339 timestamps, ISO dates and date-times (UTC), and the
/// day-first and month-name forms seen in scraped listings. Returns `None`
/// for empty or unrecognised input.
pub fn parse_date_ms(input: &str) -> Option<TimestampMs> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}
