//! Booking schedule parsing
//!
//! The model supplies `dateTime` either as a full RFC 3339 timestamp or as a
//! bare `YYYY-MM-DD` date. Timestamps keep their own offset; date-only inputs
//! are pinned to 12:00 in the fixed business timezone so a booking never
//! silently shifts a day when the server runs in UTC.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use retiro_common::config::DEFAULT_BOOKING_HOUR;
use retiro_common::{Error, Result};

/// Build the fixed business-timezone offset from a whole-hour UTC offset.
pub fn business_offset(utc_offset_hours: i32) -> FixedOffset {
    FixedOffset::east_opt(utc_offset_hours * 3600)
        .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
}

/// Parse a booking date/time from model-supplied text.
///
/// Accepted forms, tried in order:
/// 1. RFC 3339 (`2025-07-26T17:00:00-06:00`, `2025-07-26T23:00:00Z`)
/// 2. Naive date-time (`2025-07-26T17:00:00`, `2025-07-26 17:00`), read in
///    the business timezone
/// 3. Bare date (`2025-07-26`), read as 12:00 business time
///
/// Anything else is an `InvalidArgument`.
pub fn parse_scheduled_at(raw: &str, business_tz: FixedOffset) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return in_business_tz(naive, business_tz, raw);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let time = NaiveTime::from_hms_opt(DEFAULT_BOOKING_HOUR, 0, 0)
            .expect("booking hour is a valid time");
        return in_business_tz(date.and_time(time), business_tz, raw);
    }

    Err(Error::InvalidArgument(format!(
        "Unparsable booking date/time: {:?} (expected RFC 3339 or YYYY-MM-DD)",
        raw
    )))
}

fn in_business_tz(
    naive: NaiveDateTime,
    business_tz: FixedOffset,
    raw: &str,
) -> Result<DateTime<Utc>> {
    naive
        .and_local_timezone(business_tz)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidArgument(format!("Ambiguous booking date/time: {:?}", raw)))
}
