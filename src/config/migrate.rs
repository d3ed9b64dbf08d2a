//! Configuration file upgrades: detect and fill fields added by newer versions.

use crate::config::{Config, default_currency, default_max_attachment_mb, default_separator_char};
use crate::errors::{AppError, AppResult};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// Fields every configuration file is expected to carry, with their defaults.
fn expected_fields() -> Vec<(&'static str, Value)> {
    vec![
        (
            "database",
            Value::String(Config::database_file().to_string_lossy().to_string()),
        ),
        ("current_user", Value::Null),
        ("default_currency", Value::String(default_currency())),
        ("default_hourly_rate", Value::from(0.0)),
        ("max_attachment_mb", Value::from(default_max_attachment_mb())),
        ("separator_char", Value::String(default_separator_char())),
    ]
}

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    let yaml: Value = serde_yaml::from_str(&content)?;
    match yaml {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{} is not a YAML mapping",
            path.display()
        ))),
    }
}

/// Return the names of the expected fields missing from the file.
pub fn missing_fields(path: &Path) -> AppResult<Vec<&'static str>> {
    let map = read_mapping(path)?;
    Ok(expected_fields()
        .into_iter()
        .filter(|(k, _)| !map.contains_key(Value::String(k.to_string())))
        .map(|(k, _)| k)
        .collect())
}

/// Add every missing field with its default value. Existing values are never
/// overwritten. Returns the names of the fields that were added.
pub fn migrate_config(path: &Path) -> AppResult<Vec<&'static str>> {
    let mut map = read_mapping(path)?;
    let mut added = Vec::new();

    for (key, default) in expected_fields() {
        let k = Value::String(key.to_string());
        if !map.contains_key(&k) {
            map.insert(k, default);
            added.push(key);
        }
    }

    if !added.is_empty() {
        let yaml = serde_yaml::to_string(&Value::Mapping(map))?;
        fs::write(path, yaml)?;
    }

    Ok(added)
}
