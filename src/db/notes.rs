use crate::errors::{AppError, AppResult};
use crate::models::note::Note;
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_note(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        project_id: row.get("project_id")?,
        client_id: row.get("client_id")?,
        title: row.get("title")?,
        body: row.get("body")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_note(conn: &Connection, n: &Note) -> AppResult<i64> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO notes (user_id, project_id, client_id, title, body, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![n.user_id, n.project_id, n.client_id, n.title, n.body, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_note(conn: &Connection, n: &Note) -> AppResult<()> {
    conn.execute(
        "UPDATE notes SET title = ?1, body = ?2, project_id = ?3, client_id = ?4, updated_at = ?5
         WHERE id = ?6",
        params![n.title, n.body, n.project_id, n.client_id, now_rfc3339(), n.id],
    )?;
    Ok(())
}

pub fn get_note(conn: &Connection, id: i64) -> AppResult<Note> {
    conn.query_row("SELECT * FROM notes WHERE id = ?1", [id], map_note)
        .optional()?
        .ok_or_else(|| AppError::not_found("Note", id))
}

pub fn list_notes(
    conn: &Connection,
    user_id: i64,
    project_id: Option<i64>,
    client_id: Option<i64>,
) -> AppResult<Vec<Note>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM notes
         WHERE user_id = ?1
           AND (?2 IS NULL OR project_id = ?2)
           AND (?3 IS NULL OR client_id = ?3)
         ORDER BY updated_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![user_id, project_id, client_id], map_note)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_note(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
    Ok(())
}
