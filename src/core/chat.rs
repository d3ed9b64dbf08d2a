use crate::core::auth::{Actor, ensure_can_view_project};
use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{messages as message_db, projects as project_db};
use crate::errors::AppResult;
use crate::models::message::Message;

pub const DEFAULT_HISTORY: usize = 50;

pub struct ChatLogic;

impl ChatLogic {
    pub fn send(pool: &mut DbPool, actor: &Actor, project_id: i64, body: &str) -> AppResult<i64> {
        let project = project_db::get_project(&pool.conn, project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;
        let body = validate::non_empty("message", body)?;
        let id = message_db::insert_message(&pool.conn, project.id, actor.id(), &body)?;
        audit(&pool.conn, "chat_send", &project.id.to_string(), &format!("message #{id}"));
        Ok(id)
    }

    /// Latest messages, oldest first.
    pub fn history(pool: &mut DbPool, actor: &Actor, project_id: i64, limit: Option<usize>) -> AppResult<Vec<Message>> {
        let project = project_db::get_project(&pool.conn, project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;
        message_db::latest(&pool.conn, project.id, limit.unwrap_or(DEFAULT_HISTORY))
    }
}
