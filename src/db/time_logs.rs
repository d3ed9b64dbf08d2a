use crate::db::{bad_column, datetime_col, fmt_date};
use crate::errors::{AppError, AppResult};
use crate::models::time_log::{ApprovalStatus, TimeLog, TimeLogFilter, TimeLogRow};
use crate::utils::time::{format_datetime, now_rfc3339};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_time_log(row: &Row) -> rusqlite::Result<TimeLog> {
    let status_str: String = row.get("status")?;
    let status = ApprovalStatus::from_db_str(&status_str)
        .ok_or_else(|| bad_column(AppError::Other(format!("Invalid status: {status_str}"))))?;

    let start: String = row.get("start_time")?;
    let start_time = datetime_col(Some(start))?
        .ok_or_else(|| bad_column(AppError::InvalidTime("empty start_time".into())))?;

    Ok(TimeLog {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        project_id: row.get("project_id")?,
        task_id: row.get("task_id")?,
        description: row.get("description")?,
        start_time,
        end_time: datetime_col(row.get("end_time")?)?,
        duration_minutes: row.get("duration_minutes")?,
        hourly_rate: row.get("hourly_rate")?,
        is_paid: row.get::<_, i32>("is_paid")? == 1,
        status,
        invoice_id: row.get("invoice_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn map_row(row: &Row) -> rusqlite::Result<TimeLogRow> {
    Ok(TimeLogRow {
        log: map_time_log(row)?,
        project_name: row.get("project_name")?,
        task_title: row.get("task_title")?,
        user_email: row.get("user_email")?,
        currency: row.get("currency")?,
    })
}

pub fn insert_time_log(conn: &Connection, t: &TimeLog) -> AppResult<i64> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO time_logs (user_id, project_id, task_id, description, start_time, end_time,
                                duration_minutes, hourly_rate, is_paid, status, invoice_id,
                                created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            t.user_id,
            t.project_id,
            t.task_id,
            t.description,
            format_datetime(&t.start_time),
            t.end_time.as_ref().map(format_datetime),
            t.duration_minutes,
            t.hourly_rate,
            if t.is_paid { 1 } else { 0 },
            t.status.to_db_str(),
            t.invoice_id,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_time_log(conn: &Connection, t: &TimeLog) -> AppResult<()> {
    conn.execute(
        "UPDATE time_logs
         SET task_id = ?1, description = ?2, start_time = ?3, end_time = ?4,
             duration_minutes = ?5, hourly_rate = ?6, is_paid = ?7, status = ?8,
             invoice_id = ?9, updated_at = ?10
         WHERE id = ?11",
        params![
            t.task_id,
            t.description,
            format_datetime(&t.start_time),
            t.end_time.as_ref().map(format_datetime),
            t.duration_minutes,
            t.hourly_rate,
            if t.is_paid { 1 } else { 0 },
            t.status.to_db_str(),
            t.invoice_id,
            now_rfc3339(),
            t.id,
        ],
    )?;
    Ok(())
}

pub fn get_time_log(conn: &Connection, id: i64) -> AppResult<TimeLog> {
    conn.query_row("SELECT * FROM time_logs WHERE id = ?1", [id], map_time_log)
        .optional()?
        .ok_or_else(|| AppError::not_found("Time log", id))
}

pub fn delete_time_log(conn: &Connection, id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM taggables WHERE taggable_type = 'time_log' AND taggable_id = ?1",
        [id],
    )?;
    tx.execute("DELETE FROM time_logs WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(())
}

pub fn running_for_user(conn: &Connection, user_id: i64) -> AppResult<Option<TimeLog>> {
    Ok(conn
        .query_row(
            "SELECT * FROM time_logs WHERE user_id = ?1 AND end_time IS NULL
             ORDER BY start_time DESC LIMIT 1",
            [user_id],
            map_time_log,
        )
        .optional()?)
}

const ROW_SELECT: &str = "SELECT l.*, p.name AS project_name, t.title AS task_title,
                                 u.email AS user_email, p.currency AS currency
                          FROM time_logs l
                          JOIN projects p ON p.id = l.project_id
                          JOIN users u ON u.id = l.user_id
                          LEFT JOIN tasks t ON t.id = l.task_id";

/// Logs visible to the viewer: their own plus every log on projects they own.
pub fn list_time_logs(
    conn: &Connection,
    viewer_id: i64,
    f: &TimeLogFilter,
) -> AppResult<Vec<TimeLogRow>> {
    let sql = format!(
        "{ROW_SELECT}
         WHERE (l.user_id = ?1 OR (?6 = 0 AND p.user_id = ?1))
           AND (?2 IS NULL OR l.project_id = ?2)
           AND (?3 IS NULL OR l.status = ?3)
           AND (?4 IS NULL OR substr(l.start_time, 1, 10) >= ?4)
           AND (?5 IS NULL OR substr(l.start_time, 1, 10) <= ?5)
         ORDER BY l.start_time ASC, l.id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            viewer_id,
            f.project_id,
            f.status.map(|s| s.to_db_str()),
            f.from.as_ref().map(fmt_date),
            f.to.as_ref().map(fmt_date),
            if f.only_mine { 1 } else { 0 },
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Approved, finished, unpaid and not yet invoiced logs on the client's
/// projects owned by `owner_id`.
pub fn billable_for_client(
    conn: &Connection,
    owner_id: i64,
    client_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> AppResult<Vec<TimeLogRow>> {
    let sql = format!(
        "{ROW_SELECT}
         WHERE p.user_id = ?1 AND p.client_id = ?2
           AND l.status = 'approved' AND l.end_time IS NOT NULL
           AND l.is_paid = 0 AND l.invoice_id IS NULL
           AND (?3 IS NULL OR substr(l.start_time, 1, 10) >= ?3)
           AND (?4 IS NULL OR substr(l.start_time, 1, 10) <= ?4)
         ORDER BY l.start_time ASC, l.id ASC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            owner_id,
            client_id,
            from.as_ref().map(fmt_date),
            to.as_ref().map(fmt_date)
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn count_pending_for_owner(conn: &Connection, owner_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM time_logs l JOIN projects p ON p.id = l.project_id
         WHERE p.user_id = ?1 AND l.status = 'pending' AND l.end_time IS NOT NULL",
        [owner_id],
        |r| r.get(0),
    )?)
}
