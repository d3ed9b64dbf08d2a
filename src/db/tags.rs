use crate::errors::AppResult;
use crate::models::tag::{Tag, Taggable};
use rusqlite::{Connection, params};

/// Return the id of the user's tag, creating it when missing.
pub fn ensure_tag(conn: &Connection, user_id: i64, name: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO tags (user_id, name) VALUES (?1, ?2)",
        params![user_id, name],
    )?;
    Ok(conn.query_row(
        "SELECT id FROM tags WHERE user_id = ?1 AND name = ?2",
        params![user_id, name],
        |r| r.get(0),
    )?)
}

pub fn attach(conn: &Connection, tag_id: i64, kind: Taggable, target_id: i64) -> AppResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO taggables (tag_id, taggable_type, taggable_id) VALUES (?1, ?2, ?3)",
        params![tag_id, kind.to_db_str(), target_id],
    )?;
    Ok(())
}

pub fn names_for(conn: &Connection, kind: Taggable, target_id: i64) -> AppResult<Vec<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT t.name FROM taggables g JOIN tags t ON t.id = g.tag_id
         WHERE g.taggable_type = ?1 AND g.taggable_id = ?2
         ORDER BY t.name",
    )?;
    let rows = stmt.query_map(params![kind.to_db_str(), target_id], |r| r.get(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Tag ids attached to a record (used to copy tags forward).
pub fn ids_for(conn: &Connection, kind: Taggable, target_id: i64) -> AppResult<Vec<i64>> {
    let mut stmt = conn.prepare_cached(
        "SELECT tag_id FROM taggables WHERE taggable_type = ?1 AND taggable_id = ?2",
    )?;
    let rows = stmt.query_map(params![kind.to_db_str(), target_id], |r| r.get(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Prefix search over the user's tags, with usage counts.
pub fn search(conn: &Connection, user_id: i64, prefix: &str, limit: usize) -> AppResult<Vec<Tag>> {
    let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, COUNT(g.tag_id) AS usage
         FROM tags t LEFT JOIN taggables g ON g.tag_id = t.id
         WHERE t.user_id = ?1 AND t.name LIKE ?2 || '%' ESCAPE '\\'
         GROUP BY t.id, t.name
         ORDER BY t.name ASC
         LIMIT ?3",
    )?;
    let rows = stmt.query_map(params![user_id, escaped, limit as i64], |row| {
        Ok(Tag {
            id: row.get(0)?,
            name: row.get(1)?,
            usage: row.get(2)?,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
