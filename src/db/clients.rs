use crate::errors::{AppError, AppResult};
use crate::models::client::Client;
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_client(row: &Row) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        address: row.get("address")?,
        currency: row.get("currency")?,
        hourly_rate: row.get("hourly_rate")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_client(conn: &Connection, c: &Client) -> AppResult<i64> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO clients (user_id, name, email, address, currency, hourly_rate, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
        params![c.user_id, c.name, c.email, c.address, c.currency, c.hourly_rate, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_client(conn: &Connection, c: &Client) -> AppResult<()> {
    conn.execute(
        "UPDATE clients
         SET name = ?1, email = ?2, address = ?3, currency = ?4, hourly_rate = ?5, updated_at = ?6
         WHERE id = ?7",
        params![c.name, c.email, c.address, c.currency, c.hourly_rate, now_rfc3339(), c.id],
    )?;
    Ok(())
}

pub fn get_client(conn: &Connection, id: i64) -> AppResult<Client> {
    conn.query_row("SELECT * FROM clients WHERE id = ?1", [id], map_client)
        .optional()?
        .ok_or_else(|| AppError::not_found("Client", id))
}

pub fn list_clients(conn: &Connection, user_id: i64) -> AppResult<Vec<Client>> {
    let mut stmt =
        conn.prepare("SELECT * FROM clients WHERE user_id = ?1 ORDER BY name COLLATE NOCASE ASC")?;
    let rows = stmt.query_map([user_id], map_client)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_invoices(conn: &Connection, client_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM invoices WHERE client_id = ?1",
        [client_id],
        |r| r.get(0),
    )?)
}

pub fn delete_client(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM clients WHERE id = ?1", [id])?;
    Ok(())
}
