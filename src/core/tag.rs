use crate::core::auth::Actor;
use crate::db::pool::DbPool;
use crate::db::tags as tag_db;
use crate::errors::AppResult;
use crate::models::tag::{Tag, Taggable, normalize_tag};
use rusqlite::Connection;

/// Autocomplete returns at most this many tags.
pub const AUTOCOMPLETE_LIMIT: usize = 20;

pub struct TagLogic;

impl TagLogic {
    /// Attach the named tags (created on the fly) to a record. Blank names
    /// are ignored.
    pub fn attach_all(
        conn: &Connection,
        user_id: i64,
        kind: Taggable,
        target_id: i64,
        names: &[String],
    ) -> AppResult<()> {
        for raw in names {
            let name = normalize_tag(raw);
            if name.is_empty() {
                continue;
            }
            let tag_id = tag_db::ensure_tag(conn, user_id, &name)?;
            tag_db::attach(conn, tag_id, kind, target_id)?;
        }
        Ok(())
    }

    pub fn autocomplete(pool: &mut DbPool, actor: &Actor, prefix: &str) -> AppResult<Vec<Tag>> {
        tag_db::search(&pool.conn, actor.id(), &normalize_tag(prefix), AUTOCOMPLETE_LIMIT)
    }
}
