pub mod attach;
pub mod backup;
pub mod chat;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod export;
pub mod init;
pub mod invoice;
pub mod log;
pub mod note;
pub mod project;
pub mod tag;
pub mod task;
pub mod team;
pub mod time;
pub mod tracker;
pub mod user;

use crate::config::Config;
use crate::core::auth::{Actor, resolve_actor};
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Open the configured database and resolve the acting user.
pub(crate) fn open_session(cfg: &Config) -> AppResult<(DbPool, Actor)> {
    let pool = DbPool::open(&cfg.database)?;
    let actor = resolve_actor(&pool.conn, cfg.current_user.as_deref())?;
    Ok((pool, actor))
}
