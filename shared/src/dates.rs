//! Date helpers for column headers and range filters
//!
//! Timestamps travel as UTC epoch seconds; headers and calendar-day bounds
//! are resolved in the configured display timezone.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Default display timezone
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Prague;

const SECONDS_PER_DAY: i64 = 86_400;

/// Format a column timestamp, e.g. `15. 8. 2025 8:12:00`
pub fn format_column(timestamp: i64, tz: Tz) -> String {
    match DateTime::<Utc>::from_timestamp(timestamp, 0) {
        Some(dt) => dt.with_timezone(&tz).format("%-d. %-m. %Y %-H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// Format every column timestamp
pub fn format_columns(columns: &[i64], tz: Tz) -> Vec<String> {
    columns.iter().map(|ts| format_column(*ts, tz)).collect()
}

/// Format a calendar day, e.g. `18. 1. 2025`
pub fn format_day(date: NaiveDate) -> String {
    date.format("%-d. %-m. %Y").to_string()
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_day(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

fn local_timestamp(date: NaiveDate, time: NaiveTime, tz: Tz) -> i64 {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| naive.and_utc().timestamp())
}

/// Epoch seconds of 00:00:00 local time on `date`
pub fn start_of_day(date: NaiveDate, tz: Tz) -> i64 {
    local_timestamp(date, NaiveTime::MIN, tz)
}

/// Epoch seconds of 23:59:59 local time on `date`
pub fn end_of_day(date: NaiveDate, tz: Tz) -> i64 {
    let end = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
    local_timestamp(date, end, tz)
}

/// Preset date windows offered next to the manual date pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickRange {
    Last7,
    Last30,
    ThisMonth,
    All,
}

impl QuickRange {
    /// Resolve to inclusive `(from, to)` epoch bounds relative to `now`
    pub fn bounds(&self, now: DateTime<Utc>, tz: Tz) -> (Option<i64>, Option<i64>) {
        let to = now.timestamp();
        match self {
            QuickRange::Last7 => (Some(to - 7 * SECONDS_PER_DAY), Some(to)),
            QuickRange::Last30 => (Some(to - 30 * SECONDS_PER_DAY), Some(to)),
            QuickRange::ThisMonth => {
                let local = now.with_timezone(&tz).date_naive();
                let first = local.with_day(1).unwrap_or(local);
                (Some(start_of_day(first, tz)), Some(to))
            }
            QuickRange::All => (None, None),
        }
    }
}

impl std::str::FromStr for QuickRange {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last7" | "last_7" | "7d" => Ok(QuickRange::Last7),
            "last30" | "last_30" | "30d" => Ok(QuickRange::Last30),
            "this_month" | "month" => Ok(QuickRange::ThisMonth),
            "all" => Ok(QuickRange::All),
            _ => Err(ValidationError::UnknownRange(s.to_string())),
        }
    }
}

/// Parse an IANA timezone name
pub fn parse_timezone(name: &str) -> Result<Tz, ValidationError> {
    name.parse::<Tz>()
        .map_err(|_| ValidationError::InvalidTimezone(name.to_string()))
}
