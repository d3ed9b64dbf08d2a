//! Time utilities: parsing timestamps, duration computations, "now" helpers.

use crate::errors::{AppError, AppResult};
use chrono::{Local, NaiveDateTime};

/// Storage and CLI format for timestamps.
pub const DATETIME_FMT: &str = "%Y-%m-%d %H:%M";

pub fn now() -> NaiveDateTime {
    let n = Local::now().naive_local();
    // minute precision, like everything else we store
    NaiveDateTime::parse_from_str(&n.format(DATETIME_FMT).to_string(), DATETIME_FMT).unwrap_or(n)
}

/// Audit/row timestamp in ISO 8601.
pub fn now_rfc3339() -> String {
    Local::now().to_rfc3339()
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_FMT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M"))
        .ok()
}

pub fn parse_optional_datetime(input: Option<&String>) -> AppResult<Option<NaiveDateTime>> {
    if let Some(s) = input {
        let t = parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.to_string()))?;
        Ok(Some(t))
    } else {
        Ok(None)
    }
}

pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format(DATETIME_FMT).to_string()
}

pub fn minutes_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    (end - start).num_minutes()
}
