use crate::errors::{AppError, AppResult};
use crate::models::user::User;
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_user(conn: &Connection, name: &str, email: &str) -> AppResult<User> {
    conn.execute(
        "INSERT INTO users (name, email, created_at) VALUES (?1, ?2, ?3)",
        params![name, email, now_rfc3339()],
    )?;
    get_user(conn, conn.last_insert_rowid())
}

pub fn get_user(conn: &Connection, id: i64) -> AppResult<User> {
    conn.query_row("SELECT * FROM users WHERE id = ?1", [id], map_user)
        .optional()?
        .ok_or_else(|| AppError::not_found("User", id))
}

pub fn find_by_email(conn: &Connection, email: &str) -> AppResult<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT * FROM users WHERE email = ?1 COLLATE NOCASE",
            [email.trim()],
            map_user,
        )
        .optional()?)
}

pub fn list_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY name ASC")?;
    let rows = stmt.query_map([], map_user)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
