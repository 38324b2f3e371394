use chrono::{DateTime, NaiveDate};
use thiserror::Error;

/// The provider reports UTC instants; the dashboard's day boundaries are
/// fixed at +09:00 (JST), with no DST to worry about.
pub const LOCAL_OFFSET_MILLIS: i64 = 9 * 60 * 60 * 1000;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// A point that cannot be placed on the calendar. Dropped (with a warning)
/// by the caller, never surfaced to the sync caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidPoint {
    #[error("point has no startTimeNanos")]
    MissingStartTime,
    #[error("startTimeNanos '{0}' is not an integer")]
    UnparseableStartTime(String),
    #[error("startTimeNanos {0} is outside the representable range")]
    OutOfRangeTimestamp(i64),
}

/// Parse the provider's string-encoded epoch nanoseconds. A missing or
/// non-numeric value is an error, never a silent zero.
pub fn parse_source_nanos(start_time_nanos: Option<&str>) -> Result<i64, InvalidPoint> {
    let raw = start_time_nanos.ok_or(InvalidPoint::MissingStartTime)?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| InvalidPoint::UnparseableStartTime(raw.to_string()))
}

/// Calendar day the instant falls on in the fixed local offset: shift by
/// +9h, then truncate to midnight. The shifted value is treated as a
/// UTC-labeled instant so the truncation stays offset-free.
pub fn local_day(source_nanos: i64) -> Result<NaiveDate, InvalidPoint> {
    let local_millis = source_nanos
        .div_euclid(NANOS_PER_MILLI)
        .checked_add(LOCAL_OFFSET_MILLIS)
        .ok_or(InvalidPoint::OutOfRangeTimestamp(source_nanos))?;
    let local = DateTime::from_timestamp_millis(local_millis)
        .ok_or(InvalidPoint::OutOfRangeTimestamp(source_nanos))?;
    Ok(local.date_naive())
}
