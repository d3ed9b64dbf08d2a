//! Field validation shared by the create/update operations.

use crate::errors::{AppError, AppResult};

pub fn non_empty(field: &str, value: &str) -> AppResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(AppError::validation(field, "must not be empty"));
    }
    Ok(v.to_string())
}

pub fn email(field: &str, value: &str) -> AppResult<String> {
    let v = non_empty(field, value)?;
    match v.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(v.to_lowercase()),
        _ => Err(AppError::validation(field, format!("'{v}' is not a valid e-mail"))),
    }
}

/// ISO 4217 style code: three ASCII letters, stored uppercase.
pub fn currency(value: &str) -> AppResult<String> {
    let v = value.trim().to_uppercase();
    if v.len() != 3 || !v.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::validation(
            "currency",
            format!("'{value}' is not a 3-letter currency code"),
        ));
    }
    Ok(v)
}

pub fn non_negative(field: &str, value: f64) -> AppResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(field, "must be a non-negative number"));
    }
    Ok(value)
}

/// Trimmed optional text; blank becomes None.
pub fn optional_text(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
