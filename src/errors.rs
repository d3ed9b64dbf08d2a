//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid recurring frequency: {0}")]
    InvalidFrequency(String),

    // ---------------------------
    // Request errors (validation / authorization / lookup)
    // ---------------------------
    #[error("Validation failed on '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{entity} #{id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("No active user: pass --user <email> or run `rtimesheet user switch <email>`")]
    NoActiveUser,

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Issue tracker errors
    // ---------------------------
    #[error("Tracker error: {0}")]
    Tracker(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Process exit code: 2 for validation, 3 for authorization,
    /// 4 for missing records, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation { .. }
            | AppError::InvalidDate(_)
            | AppError::InvalidTime(_)
            | AppError::InvalidFrequency(_) => 2,
            AppError::Forbidden(_) => 3,
            AppError::NotFound { .. } => 4,
            _ => 1,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
