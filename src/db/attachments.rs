use crate::errors::{AppError, AppResult};
use crate::models::attachment::Attachment;
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_attachment(row: &Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        user_id: row.get("user_id")?,
        file_name: row.get("file_name")?,
        stored_path: row.get("stored_path")?,
        size_bytes: row.get("size_bytes")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_attachment(conn: &Connection, a: &Attachment) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO attachments (task_id, user_id, file_name, stored_path, size_bytes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![a.task_id, a.user_id, a.file_name, a.stored_path, a.size_bytes, now_rfc3339()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_attachment(conn: &Connection, id: i64) -> AppResult<Attachment> {
    conn.query_row("SELECT * FROM attachments WHERE id = ?1", [id], map_attachment)
        .optional()?
        .ok_or_else(|| AppError::not_found("Attachment", id))
}

pub fn list_for_task(conn: &Connection, task_id: i64) -> AppResult<Vec<Attachment>> {
    let mut stmt = conn.prepare("SELECT * FROM attachments WHERE task_id = ?1 ORDER BY id ASC")?;
    let rows = stmt.query_map([task_id], map_attachment)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_attachment(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM attachments WHERE id = ?1", [id])?;
    Ok(())
}
