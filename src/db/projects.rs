use crate::errors::{AppError, AppResult};
use crate::models::project::{Project, ProjectMember, TeamMember};
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, Row, params};

fn map_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        client_id: row.get("client_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        currency: row.get("currency")?,
        hourly_rate: row.get("hourly_rate")?,
        archived: row.get::<_, i32>("archived")? == 1,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn insert_project(conn: &Connection, p: &Project) -> AppResult<i64> {
    let now = now_rfc3339();
    conn.execute(
        "INSERT INTO projects (user_id, client_id, name, description, currency, hourly_rate, archived, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)",
        params![p.user_id, p.client_id, p.name, p.description, p.currency, p.hourly_rate, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_project(conn: &Connection, p: &Project) -> AppResult<()> {
    conn.execute(
        "UPDATE projects
         SET client_id = ?1, name = ?2, description = ?3, currency = ?4,
             hourly_rate = ?5, archived = ?6, updated_at = ?7
         WHERE id = ?8",
        params![
            p.client_id,
            p.name,
            p.description,
            p.currency,
            p.hourly_rate,
            if p.archived { 1 } else { 0 },
            now_rfc3339(),
            p.id
        ],
    )?;
    Ok(())
}

pub fn get_project(conn: &Connection, id: i64) -> AppResult<Project> {
    conn.query_row("SELECT * FROM projects WHERE id = ?1", [id], map_project)
        .optional()?
        .ok_or_else(|| AppError::not_found("Project", id))
}

/// Projects the user owns or is a member of.
pub fn list_visible(conn: &Connection, user_id: i64, include_archived: bool) -> AppResult<Vec<Project>> {
    let mut stmt = conn.prepare(
        "SELECT p.* FROM projects p
         WHERE (p.user_id = ?1
                OR EXISTS (SELECT 1 FROM project_members m
                           WHERE m.project_id = p.id AND m.user_id = ?1))
           AND (?2 = 1 OR p.archived = 0)
         ORDER BY p.name COLLATE NOCASE ASC",
    )?;
    let rows = stmt.query_map(params![user_id, include_archived as i32], map_project)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn delete_project(conn: &Connection, id: i64) -> AppResult<()> {
    conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
    Ok(())
}

// ---------------------------
// Project membership
// ---------------------------

pub fn is_member(conn: &Connection, project_id: i64, user_id: i64) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM project_members WHERE project_id = ?1 AND user_id = ?2",
    )?;
    Ok(stmt.exists(params![project_id, user_id])?)
}

pub fn add_member(
    conn: &Connection,
    project_id: i64,
    user_id: i64,
    hourly_rate: Option<f64>,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO project_members (project_id, user_id, hourly_rate) VALUES (?1, ?2, ?3)
         ON CONFLICT(project_id, user_id) DO UPDATE SET hourly_rate = excluded.hourly_rate",
        params![project_id, user_id, hourly_rate],
    )?;
    Ok(())
}

pub fn remove_member(conn: &Connection, project_id: i64, user_id: i64) -> AppResult<usize> {
    Ok(conn.execute(
        "DELETE FROM project_members WHERE project_id = ?1 AND user_id = ?2",
        params![project_id, user_id],
    )?)
}

pub fn list_members(conn: &Connection, project_id: i64) -> AppResult<Vec<ProjectMember>> {
    let mut stmt = conn.prepare(
        "SELECT m.project_id, m.user_id, u.name, u.email, m.hourly_rate
         FROM project_members m JOIN users u ON u.id = m.user_id
         WHERE m.project_id = ?1
         ORDER BY u.name",
    )?;
    let rows = stmt.query_map([project_id], |row| {
        Ok(ProjectMember {
            project_id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            hourly_rate: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn member_rate(conn: &Connection, project_id: i64, user_id: i64) -> AppResult<Option<f64>> {
    Ok(conn
        .query_row(
            "SELECT hourly_rate FROM project_members WHERE project_id = ?1 AND user_id = ?2",
            params![project_id, user_id],
            |r| r.get::<_, Option<f64>>(0),
        )
        .optional()?
        .flatten())
}

// ---------------------------
// Team
// ---------------------------

pub fn is_team_member(conn: &Connection, owner_id: i64, member_id: i64) -> AppResult<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM team_members WHERE owner_id = ?1 AND member_id = ?2",
    )?;
    Ok(stmt.exists(params![owner_id, member_id])?)
}

pub fn add_team_member(
    conn: &Connection,
    owner_id: i64,
    member_id: i64,
    hourly_rate: Option<f64>,
) -> AppResult<()> {
    conn.execute(
        "INSERT INTO team_members (owner_id, member_id, hourly_rate, created_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(owner_id, member_id) DO UPDATE SET hourly_rate = excluded.hourly_rate",
        params![owner_id, member_id, hourly_rate, now_rfc3339()],
    )?;
    Ok(())
}

/// Remove the member from the team and from every project of the owner.
pub fn remove_team_member(conn: &Connection, owner_id: i64, member_id: i64) -> AppResult<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM project_members
         WHERE user_id = ?2
           AND project_id IN (SELECT id FROM projects WHERE user_id = ?1)",
        params![owner_id, member_id],
    )?;
    let n = tx.execute(
        "DELETE FROM team_members WHERE owner_id = ?1 AND member_id = ?2",
        params![owner_id, member_id],
    )?;
    tx.commit()?;
    Ok(n)
}

pub fn list_team(conn: &Connection, owner_id: i64) -> AppResult<Vec<TeamMember>> {
    let mut stmt = conn.prepare(
        "SELECT t.owner_id, t.member_id, u.name, u.email, t.hourly_rate
         FROM team_members t JOIN users u ON u.id = t.member_id
         WHERE t.owner_id = ?1
         ORDER BY u.name",
    )?;
    let rows = stmt.query_map([owner_id], |row| {
        Ok(TeamMember {
            owner_id: row.get(0)?,
            member_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            hourly_rate: row.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn team_rate(conn: &Connection, owner_id: i64, member_id: i64) -> AppResult<Option<f64>> {
    Ok(conn
        .query_row(
            "SELECT hourly_rate FROM team_members WHERE owner_id = ?1 AND member_id = ?2",
            params![owner_id, member_id],
            |r| r.get::<_, Option<f64>>(0),
        )
        .optional()?
        .flatten())
}
