//! Path utilities: expand ~, validate absolute paths, attachment storage.

use std::path::{Path, PathBuf};

pub fn expand_tilde(path: &str) -> PathBuf {
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path.trim_start_matches("~/"));
    }
    PathBuf::from(path)
}

pub fn is_absolute(path: &str) -> bool {
    expand_tilde(path).is_absolute()
}

/// Attachments live next to the database, under `attachments/<task id>/`.
pub fn attachments_dir(database: &str, task_id: i64) -> PathBuf {
    let db = Path::new(database);
    let base = db.parent().map(Path::to_path_buf).unwrap_or_default();
    base.join("attachments").join(task_id.to_string())
}
