use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;

use crate::error::{Result, VaultError};

/// Epoch values above this are taken to be milliseconds rather than seconds.
const MILLIS_THRESHOLD: f64 = 1e11;

/// ISO 8601 date-times with an explicit offset that RFC 3339 does not cover
/// (basic `+0200` offsets, minute precision).
const OFFSET_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z", "%Y-%m-%d %H:%M%z"];

/// Naive ISO 8601 date-times, read as UTC.
const NAIVE_FORMATS: [&str; 4] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// Parse a raw timestamp field: epoch seconds (fractional allowed), epoch milliseconds,
/// or an ISO 8601 string. Anything else yields `None`, never an error.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let raw = n.as_f64()?;
            if !raw.is_finite() {
                return None;
            }
            let millis = if raw.abs() > MILLIS_THRESHOLD { raw } else { raw * 1000.0 };
            DateTime::from_timestamp_millis(millis.round() as i64)
        }
        Value::String(s) => parse_iso(s),
        _ => None,
    }
}

/// Parse ISO 8601 (RFC 3339, other offset forms, minute or second precision), or a naive
/// date/date-time interpreted as UTC.
pub fn parse_iso(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(input) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::<FixedOffset>::parse_from_str(input, format) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d").ok().map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

/// Which end of a date range a user-supplied bound sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    Start,
    End,
}

/// Parse a date filter given as `YYYY-MM-DD` or full ISO 8601.
///
/// A date-only end bound covers the whole day (last representable instant of that day).
pub fn parse_date_bound(input: &str, bound: DateBound) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    let invalid = || VaultError::InvalidDate { input: input.to_string() };

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        let time = match bound {
            DateBound::Start => NaiveTime::MIN,
            DateBound::End => {
                NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).ok_or_else(invalid)?
            }
        };
        return Ok(date.and_time(time).and_utc());
    }

    parse_iso(trimmed).ok_or_else(invalid)
}
