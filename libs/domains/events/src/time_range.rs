//! Resolution of optional query bounds into a concrete time window

use crate::error::{EventError, Result};
use crate::models::{DEFAULT_DATETIME_FORMAT, parse_timestamp};
use chrono::{Local, NaiveDateTime, NaiveTime};

/// A resolved `[from, to)` window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl TimeRange {
    /// Resolve bounds against the current local time
    pub fn resolve(from_time: Option<&str>, to_time: Option<&str>) -> Result<Self> {
        Self::resolve_at(from_time, to_time, Local::now().naive_local())
    }

    /// Resolve bounds against `now`
    ///
    /// A missing `from_time` means the start of `now`'s day, a missing
    /// `to_time` means `now`. Empty strings count as missing.
    pub fn resolve_at(
        from_time: Option<&str>,
        to_time: Option<&str>,
        now: NaiveDateTime,
    ) -> Result<Self> {
        let from = match non_empty(from_time) {
            Some(raw) => parse_bound("from_time", raw)?,
            None => now.date().and_time(NaiveTime::MIN),
        };
        let to = match non_empty(to_time) {
            Some(raw) => parse_bound("to_time", raw)?,
            None => now,
        };

        Ok(Self { from, to })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_bound(name: &str, raw: &str) -> Result<NaiveDateTime> {
    parse_timestamp(raw).ok_or_else(|| {
        EventError::InvalidFormat(format!(
            "Invalid {} '{}', expected format {}",
            name, raw, DEFAULT_DATETIME_FORMAT
        ))
    })
}
