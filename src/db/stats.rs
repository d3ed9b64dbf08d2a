use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};
use std::fs;

/// One finished, approved time log in the dashboard scope of an owner.
#[derive(Debug, Clone)]
pub struct ScopedLog {
    pub user_id: i64,
    pub date: NaiveDate,
    pub minutes: i64,
    pub hourly_rate: f64,
    pub is_paid: bool,
    pub currency: String,
}

/// Approved, finished time logs on projects owned by `owner_id`, whoever
/// logged them. Logs on projects owned by anyone else never appear here.
pub fn scoped_logs(conn: &Connection, owner_id: i64) -> AppResult<Vec<ScopedLog>> {
    let mut stmt = conn.prepare(
        "SELECT l.user_id, substr(l.start_time, 1, 10), l.duration_minutes,
                l.hourly_rate, l.is_paid, p.currency
         FROM time_logs l
         JOIN projects p ON p.id = l.project_id
         WHERE p.user_id = ?1
           AND l.status = 'approved'
           AND l.end_time IS NOT NULL
         ORDER BY l.start_time ASC",
    )?;

    let rows = stmt.query_map([owner_id], |row| {
        let d: String = row.get(1)?;
        let date = crate::db::date_col(Some(d.clone()))?
            .ok_or_else(|| crate::db::bad_column(crate::errors::AppError::InvalidDate(d)))?;
        Ok(ScopedLog {
            user_id: row.get(0)?,
            date,
            minutes: row.get::<_, Option<i64>>(2)?.unwrap_or(0),
            hourly_rate: row.get(3)?,
            is_paid: row.get::<_, i32>(4)? == 1,
            currency: row.get(5)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_clients(conn: &Connection, owner_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM clients WHERE user_id = ?1",
        [owner_id],
        |r| r.get(0),
    )?)
}

pub fn count_active_projects(conn: &Connection, owner_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM projects WHERE user_id = ?1 AND archived = 0",
        [owner_id],
        |r| r.get(0),
    )?)
}

/// Rows whose foreign keys point at records that no longer exist.
pub fn foreign_key_violations(conn: &Connection) -> AppResult<usize> {
    let mut stmt = conn.prepare("PRAGMA foreign_key_check;")?;
    let mut rows = stmt.query([])?;
    let mut count = 0;
    while rows.next()?.is_some() {
        count += 1;
    }
    Ok(count)
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> AppResult<()> {
    println!();

    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    for table in [
        "users",
        "clients",
        "projects",
        "tasks",
        "time_logs",
        "invoices",
        "notes",
        "messages",
        "attachments",
    ] {
        let count: i64 = pool
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        println!("{}• {}:{} {}{}{}", CYAN, table, RESET, GREEN, count, RESET);
    }

    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT substr(MIN(start_time), 1, 10) FROM time_logs",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT substr(MAX(start_time), 1, 10) FROM time_logs",
            [],
            |row| row.get(0),
        )
        .optional()?
        .flatten();

    println!("{}• Time log range:{}", CYAN, RESET);
    println!(
        "    from: {}",
        first.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );
    println!(
        "    to:   {}",
        last.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    println!();
    Ok(())
}
