use crate::errors::AppResult;
use crate::models::message::Message;
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, params};

pub fn insert_message(conn: &Connection, project_id: i64, user_id: i64, body: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO messages (project_id, user_id, body, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![project_id, user_id, body, now_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// The latest `limit` messages of a project, oldest first.
pub fn latest(conn: &Connection, project_id: i64, limit: usize) -> AppResult<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM (
             SELECT m.id, m.project_id, m.user_id, u.name AS author, m.body, m.created_at
             FROM messages m JOIN users u ON u.id = m.user_id
             WHERE m.project_id = ?1
             ORDER BY m.id DESC
             LIMIT ?2
         ) ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![project_id, limit as i64], |row| {
        Ok(Message {
            id: row.get("id")?,
            project_id: row.get("project_id")?,
            user_id: row.get("user_id")?,
            author: row.get("author")?,
            body: row.get("body")?,
            created_at: row.get("created_at")?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
