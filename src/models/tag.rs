use serde::Serialize;

/// Kind of record a tag is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taggable {
    Task,
    TimeLog,
}

impl Taggable {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Taggable::Task => "task",
            Taggable::TimeLog => "time_log",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub usage: i64,
}

/// Canonical tag name: trimmed, lowercase, inner whitespace collapsed to '-'.
pub fn normalize_tag(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
