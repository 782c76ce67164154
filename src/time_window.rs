//! Fetch window and date formats for the spot price feed
//!
//! The feed takes its bounds as RFC-3339 without a zone marker and answers
//! with compact `YYYY-MM-DDTHH:MM` timestamps; the price store keys records
//! by a fixed-precision UTC string. All three formats live here.

use crate::error::{Result, SpotSyncError};
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, SecondsFormat, Timelike, Utc};
use serde::Serialize;

/// Suffix appended to compact feed timestamps before parsing
const FEED_TIME_SUFFIX: &str = ":00Z";
/// Exact layout of a compact timestamp once the suffix is appended
const FEED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Inclusive UTC range requested from the feed on each run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FetchWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl FetchWindow {
    /// Both bounds rendered for the feed query string
    pub fn query_bounds(&self) -> (String, String) {
        (format_feed_time(self.from), format_feed_time(self.to))
    }
}

/// Window from today's UTC midnight to one second before the midnight after tomorrow
pub fn fetch_window(now: DateTime<Utc>) -> FetchWindow {
    let from = start_of_day(now);
    let to = from + Duration::hours(48) - Duration::seconds(1);
    FetchWindow { from, to }
}

/// `now` truncated to UTC midnight
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// RFC-3339 in UTC with whole seconds, trailing `Z` removed
pub fn format_feed_time(t: DateTime<Utc>) -> String {
    let mut s = t.to_rfc3339_opts(SecondsFormat::Secs, true);
    s.pop();
    s
}

/// Parse a compact feed timestamp (`2024-02-25T13:00`) as a UTC instant.
///
/// Only the exact `YYYY-MM-DDTHH:MM` shape is accepted: an uppercase `T`
/// separator, zero-padded fields, nothing before or after.
pub fn parse_feed_time(raw: &str) -> Result<DateTime<Utc>> {
    if !is_compact_shape(raw) {
        return Err(SpotSyncError::decode(format!(
            "invalid startDate {:?}: expected YYYY-MM-DDTHH:MM",
            raw
        )));
    }
    let candidate = format!("{}{}", raw, FEED_TIME_SUFFIX);
    NaiveDateTime::parse_from_str(&candidate, FEED_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| SpotSyncError::decode(format!("invalid startDate {:?}: {}", raw, e)))
}

fn is_compact_shape(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() == 16
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Canonical store key: `YYYY-MM-DD HH:MM:SS.000Z` in UTC.
///
/// The fractional part is always the literal `.000`; sub-second precision
/// does not take part in matching.
pub fn store_key(t: DateTime<Utc>) -> String {
    format!("{}.000Z", t.format("%Y-%m-%d %H:%M:%S"))
}

/// Parse a canonical store key back into an instant
pub fn parse_store_key(key: &str) -> Result<DateTime<Utc>> {
    let trimmed = key
        .strip_suffix(".000Z")
        .ok_or_else(|| SpotSyncError::decode(format!("unexpected store date {:?}", key)))?;
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")?;
    Ok(naive.and_utc())
}

/// Whether `t` sits exactly on an hour boundary
pub fn is_hour_aligned(t: DateTime<Utc>) -> bool {
    t.minute() == 0 && t.second() == 0 && t.nanosecond() == 0
}
