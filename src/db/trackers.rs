use crate::db::bad_column;
use crate::errors::{AppError, AppResult};
use crate::models::tracker::{Provider, TrackerLink};
use crate::utils::time::now_rfc3339;
use rusqlite::{Connection, OptionalExtension, params};

pub fn upsert_link(conn: &Connection, link: &TrackerLink) -> AppResult<()> {
    conn.execute(
        "INSERT INTO project_trackers (project_id, provider, repository, base_url, last_synced_at)
         VALUES (?1, ?2, ?3, ?4, NULL)
         ON CONFLICT(project_id) DO UPDATE SET
             provider = excluded.provider,
             repository = excluded.repository,
             base_url = excluded.base_url,
             last_synced_at = NULL",
        params![
            link.project_id,
            link.provider.to_db_str(),
            link.repository,
            link.base_url
        ],
    )?;
    Ok(())
}

pub fn get_link(conn: &Connection, project_id: i64) -> AppResult<Option<TrackerLink>> {
    Ok(conn
        .query_row(
            "SELECT project_id, provider, repository, base_url, last_synced_at
             FROM project_trackers WHERE project_id = ?1",
            [project_id],
            |row| {
                let p: String = row.get(1)?;
                let provider = Provider::from_db_str(&p)
                    .ok_or_else(|| bad_column(AppError::Tracker(format!("unknown provider {p}"))))?;
                Ok(TrackerLink {
                    project_id: row.get(0)?,
                    provider,
                    repository: row.get(2)?,
                    base_url: row.get(3)?,
                    last_synced_at: row.get(4)?,
                })
            },
        )
        .optional()?)
}

pub fn delete_link(conn: &Connection, project_id: i64) -> AppResult<usize> {
    Ok(conn.execute(
        "DELETE FROM project_trackers WHERE project_id = ?1",
        [project_id],
    )?)
}

pub fn touch_synced(conn: &Connection, project_id: i64) -> AppResult<()> {
    conn.execute(
        "UPDATE project_trackers SET last_synced_at = ?1 WHERE project_id = ?2",
        params![now_rfc3339(), project_id],
    )?;
    Ok(())
}
