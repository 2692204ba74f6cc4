//! Timestamp normalization for the OVapi feed.
//!
//! The feed emits departure times as naive local-clock strings
//! ("2025-06-14T13:31:00") with no offset. This module interprets them as
//! civil time in the Dutch timezone (CET/CEST) and converts them to
//! absolute instants in milliseconds since the Unix epoch. Strings that do
//! carry an explicit offset are parsed as absolute directly.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};

/// Standard-time offset from UTC, in minutes (CET).
const STANDARD_OFFSET_MINS: i64 = 60;

/// Daylight-saving offset from UTC, in minutes (CEST).
const DST_OFFSET_MINS: i64 = 120;

/// Current wall-clock instant in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Parse an upstream timestamp string into an absolute instant (epoch ms).
///
/// Strings with an explicit offset ("2025-06-14T13:31:00+02:00") are parsed
/// as absolute. Naive strings are interpreted as CET/CEST civil time.
/// Malformed input yields `None`; callers skip the record or default the
/// derived value.
///
/// # Examples
///
/// ```
/// use ov_monitor::domain::parse_instant_ms;
///
/// // June is CEST (+2h): 13:31 local is 11:31 UTC.
/// let ms = parse_instant_ms("2025-06-14T13:31:00").unwrap();
/// assert_eq!(ms, 1749900660000);
///
/// assert!(parse_instant_ms("not a time").is_none());
/// ```
pub fn parse_instant_ms(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok()?;
    let offset = offset_mins_for(naive.date());

    Some(naive.and_utc().timestamp_millis() - offset * 60_000)
}

/// Format an absolute instant as a local-clock "HH:MM" display string.
///
/// The reverse of [`parse_instant_ms`] for naive input, using the same
/// date-granularity DST rule.
pub fn format_local_hhmm(instant_ms: i64) -> String {
    let Some(utc) = DateTime::from_timestamp_millis(instant_ms) else {
        return String::new();
    };

    // Recover the civil date assuming DST, then verify. Near-midnight
    // instants on the March transition day resolve to the transition day
    // itself rather than the preceding standard-time date.
    let dst_date = (utc + Duration::minutes(DST_OFFSET_MINS)).naive_utc().date();
    let offset = if in_dst(dst_date) {
        DST_OFFSET_MINS
    } else {
        STANDARD_OFFSET_MINS
    };
    let local = utc + Duration::minutes(offset);

    format!("{:02}:{:02}", local.hour(), local.minute())
}

/// UTC offset in minutes for a civil date in the Dutch timezone.
fn offset_mins_for(date: NaiveDate) -> i64 {
    if in_dst(date) {
        DST_OFFSET_MINS
    } else {
        STANDARD_OFFSET_MINS
    }
}

/// Whether daylight-saving time applies on the given civil date.
///
/// DST runs from the last Sunday of March (inclusive) through the day
/// before the last Sunday of October. The check is date-only: a transition
/// day is treated uniformly for its entire span, even though the real
/// transition happens at 02:00 local. Deviation is at most one civil day
/// twice a year; the upstream feed's own clock behaves the same way.
fn in_dst(date: NaiveDate) -> bool {
    let start = last_sunday(date.year(), 3);
    let end = last_sunday(date.year(), 10);
    date >= start && date < end
}

/// The last Sunday of a 31-day month.
fn last_sunday(year: i32, month: u32) -> NaiveDate {
    let mut day = NaiveDate::from_ymd_opt(year, month, 31).expect("31-day month");
    while day.weekday() != Weekday::Sun {
        day = day.pred_opt().expect("within month");
    }
    day
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing a naive timestamp then formatting it back yields the
        /// original wall-clock HH:MM, away from the DST boundary dates.
        #[test]
        fn naive_roundtrip_hhmm(month in 1u32..=12, day in 1u32..=28, hour in 0u32..24, minute in 0u32..60) {
            let s = format!("2025-{:02}-{:02}T{:02}:{:02}:00", month, day, hour, minute);
            let ms = parse_instant_ms(&s).unwrap();
            prop_assert_eq!(format_local_hhmm(ms), format!("{:02}:{:02}", hour, minute));
        }

        /// Parsed instants are always aligned to whole seconds.
        #[test]
        fn whole_second_instants(month in 1u32..=12, day in 1u32..=28) {
            let s = format!("2025-{:02}-{:02}T12:00:00", month, day);
            let ms = parse_instant_ms(&s).unwrap();
            prop_assert_eq!(ms % 1000, 0);
        }
    }
}
