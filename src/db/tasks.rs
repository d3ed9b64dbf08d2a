use crate::db::{bad_column, date_col, fmt_date};
use crate::errors::{AppError, AppResult};
use crate::models::frequency::Frequency;
use crate::models::task::{Priority, Task, TaskStatus};
use crate::models::user::User;
use crate::utils::time::now_rfc3339;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Row, params};

pub fn map_task(row: &Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get("status")?;
    let status = TaskStatus::from_db_str(&status_str)
        .ok_or_else(|| bad_column(AppError::Other(format!("Invalid task status: {status_str}"))))?;

    let priority_str: String = row.get("priority")?;
    let priority = Priority::from_db_str(&priority_str)
        .ok_or_else(|| bad_column(AppError::Other(format!("Invalid priority: {priority_str}"))))?;

    let freq: Option<String> = row.get("recurring_frequency")?;
    let recurring_frequency = match freq {
        None => None,
        Some(f) => Some(
            Frequency::from_db_str(&f).ok_or_else(|| bad_column(AppError::InvalidFrequency(f)))?,
        ),
    };

    Ok(Task {
        id: row.get("id")?,
        project_id: row.get("project_id")?,
        created_by: row.get("created_by")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        priority,
        due_date: date_col(row.get("due_date")?)?,
        is_recurring: row.get::<_, i32>("is_recurring")? == 1,
        recurring_frequency,
        recurring_parent_id: row.get("recurring_parent_id")?,
        external_source: row.get("external_source")?,
        external_id: row.get("external_id")?,
        external_url: row.get("external_url")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_task(conn: &Connection, t: &Task) -> AppResult<i64> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO tasks (project_id, created_by, title, description, status, priority, due_date,
                            is_recurring, recurring_frequency, recurring_parent_id,
                            external_source, external_id, external_url, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)",
        params![
            t.project_id,
            t.created_by,
            t.title,
            t.description,
            t.status.to_db_str(),
            t.priority.to_db_str(),
            t.due_date.as_ref().map(fmt_date),
            if t.is_recurring { 1 } else { 0 },
            t.recurring_frequency.map(|f| f.to_db_str()),
            t.recurring_parent_id,
            t.external_source,
            t.external_id,
            t.external_url,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_task(conn: &Connection, t: &Task) -> AppResult<()> {
    conn.execute(
        "UPDATE tasks
         SET title = ?1, description = ?2, status = ?3, priority = ?4, due_date = ?5,
             is_recurring = ?6, recurring_frequency = ?7, external_url = ?8, updated_at = ?9
         WHERE id = ?10",
        params![
            t.title,
            t.description,
            t.status.to_db_str(),
            t.priority.to_db_str(),
            t.due_date.as_ref().map(fmt_date),
            if t.is_recurring { 1 } else { 0 },
            t.recurring_frequency.map(|f| f.to_db_str()),
            t.external_url,
            now_rfc3339(),
            t.id,
        ],
    )?;
    Ok(())
}

pub fn get_task(conn: &Connection, id: i64) -> AppResult<Task> {
    conn.query_row("SELECT * FROM tasks WHERE id = ?1", [id], map_task)
        .optional()?
        .ok_or_else(|| AppError::not_found("Task", id))
}

pub fn delete_task(conn: &Connection, id: i64) -> AppResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM taggables WHERE taggable_type = 'task' AND taggable_id = ?1",
        [id],
    )?;
    tx.execute("UPDATE time_logs SET task_id = NULL WHERE task_id = ?1", [id])?;
    tx.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
    tx.commit()?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project_id: Option<i64>,
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<i64>,
}

/// Tasks on projects the viewer owns or belongs to.
pub fn list_tasks(conn: &Connection, viewer_id: i64, f: &TaskFilter) -> AppResult<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT t.* FROM tasks t
         JOIN projects p ON p.id = t.project_id
         WHERE (p.user_id = ?1
                OR EXISTS (SELECT 1 FROM project_members m
                           WHERE m.project_id = p.id AND m.user_id = ?1))
           AND (?2 IS NULL OR t.project_id = ?2)
           AND (?3 IS NULL OR t.status = ?3)
           AND (?4 IS NULL OR EXISTS (SELECT 1 FROM task_assignees a
                                      WHERE a.task_id = t.id AND a.user_id = ?4))
         ORDER BY t.due_date IS NULL, t.due_date ASC, t.id ASC",
    )?;
    let rows = stmt.query_map(
        params![
            viewer_id,
            f.project_id,
            f.status.map(|s| s.to_db_str()),
            f.assigned_to
        ],
        map_task,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Assignees
// ---------------------------

pub fn assignees(conn: &Connection, task_id: i64) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare(
        "SELECT u.* FROM task_assignees a JOIN users u ON u.id = a.user_id
         WHERE a.task_id = ?1 ORDER BY u.name",
    )?;
    let rows = stmt.query_map([task_id], |row| {
        Ok(User {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Replace the assignee set. Runs inside the caller's transaction.
pub fn set_assignees(conn: &Connection, task_id: i64, user_ids: &[i64]) -> AppResult<()> {
    conn.execute("DELETE FROM task_assignees WHERE task_id = ?1", [task_id])?;
    for uid in user_ids {
        conn.execute(
            "INSERT OR IGNORE INTO task_assignees (task_id, user_id) VALUES (?1, ?2)",
            params![task_id, uid],
        )?;
    }
    Ok(())
}

pub fn is_assignee(conn: &Connection, task_id: i64, user_id: i64) -> AppResult<bool> {
    let mut stmt =
        conn.prepare_cached("SELECT 1 FROM task_assignees WHERE task_id = ?1 AND user_id = ?2")?;
    Ok(stmt.exists(params![task_id, user_id])?)
}

// ---------------------------
// Recurrence
// ---------------------------

/// Recurring tasks due on the given date.
pub fn recurring_due_on(conn: &Connection, date: &NaiveDate) -> AppResult<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM tasks
         WHERE is_recurring = 1 AND due_date = ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map([fmt_date(date)], map_task)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// True when some task of the recurrence chain rooted at `root_id` is due on `date`.
pub fn chain_has_due(conn: &Connection, root_id: i64, date: &NaiveDate) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM tasks
         WHERE (id = ?1 OR recurring_parent_id = ?1) AND due_date = ?2",
    )?;
    Ok(stmt.exists(params![root_id, fmt_date(date)])?)
}

// ---------------------------
// External issues
// ---------------------------

pub fn find_external(
    conn: &Connection,
    project_id: i64,
    source: &str,
    external_id: &str,
) -> AppResult<Option<Task>> {
    Ok(conn
        .query_row(
            "SELECT * FROM tasks
             WHERE project_id = ?1 AND external_source = ?2 AND external_id = ?3",
            params![project_id, source, external_id],
            map_task,
        )
        .optional()?)
}

pub fn count_open_assigned(conn: &Connection, user_id: i64) -> AppResult<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM tasks t JOIN task_assignees a ON a.task_id = t.id
         WHERE a.user_id = ?1 AND t.status != 'done'",
        [user_id],
        |r| r.get(0),
    )?)
}
