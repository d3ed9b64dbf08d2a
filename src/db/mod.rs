pub mod attachments;
pub mod clients;
pub mod initialize;
pub mod invoices;
pub mod log;
pub mod messages;
pub mod migrate;
pub mod notes;
pub mod pool;
pub mod projects;
pub mod stats;
pub mod tags;
pub mod tasks;
pub mod time_logs;
pub mod trackers;
pub mod users;

use crate::errors::AppError;
use crate::utils::time::parse_datetime;
use chrono::{NaiveDate, NaiveDateTime};

/// Wrap a domain error raised while decoding a column.
pub(crate) fn bad_column(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

pub(crate) fn date_col(s: Option<String>) -> rusqlite::Result<Option<NaiveDate>> {
    match s {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| bad_column(AppError::InvalidDate(s))),
    }
}

pub(crate) fn datetime_col(s: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    match s {
        None => Ok(None),
        Some(s) => parse_datetime(&s)
            .map(Some)
            .ok_or_else(|| bad_column(AppError::InvalidTime(s))),
    }
}

pub(crate) fn fmt_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
