//! Files attached to tasks, stored beside the database.

use crate::config::Config;
use crate::core::auth::{Actor, ensure_can_view_project};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{attachments as attachment_db, projects as project_db, tasks as task_db};
use crate::errors::{AppError, AppResult};
use crate::models::attachment::Attachment;
use crate::utils::path::attachments_dir;
use std::fs;
use std::path::Path;

pub struct AttachmentLogic;

impl AttachmentLogic {
    pub fn add(pool: &mut DbPool, cfg: &Config, actor: &Actor, task_id: i64, source: &Path) -> AppResult<Attachment> {
        let task = task_db::get_task(&pool.conn, task_id)?;
        let project = project_db::get_project(&pool.conn, task.project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;

        let meta = fs::metadata(source).map_err(|_| {
            AppError::validation("file", format!("cannot read {}", source.display()))
        })?;
        if !meta.is_file() {
            return Err(AppError::validation("file", format!("{} is not a file", source.display())));
        }

        let limit = cfg.max_attachment_mb * 1024 * 1024;
        if meta.len() > limit {
            return Err(AppError::validation(
                "file",
                format!("file exceeds the {} MB limit", cfg.max_attachment_mb),
            ));
        }

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AppError::validation("file", "missing file name"))?;

        let dir = attachments_dir(&cfg.database, task.id);
        fs::create_dir_all(&dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d%H%M%S");
        let dest = dir.join(format!("{stamp}_{file_name}"));
        fs::copy(source, &dest)?;

        let mut attachment = Attachment {
            id: 0,
            task_id: task.id,
            user_id: actor.id(),
            file_name,
            stored_path: dest.to_string_lossy().to_string(),
            size_bytes: meta.len() as i64,
            created_at: String::new(),
        };
        attachment.id = attachment_db::insert_attachment(&pool.conn, &attachment)?;

        audit(&pool.conn, "attach_add", &attachment.id.to_string(), &attachment.file_name);
        attachment_db::get_attachment(&pool.conn, attachment.id)
    }

    pub fn list(pool: &mut DbPool, actor: &Actor, task_id: i64) -> AppResult<Vec<Attachment>> {
        let task = task_db::get_task(&pool.conn, task_id)?;
        let project = project_db::get_project(&pool.conn, task.project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;
        attachment_db::list_for_task(&pool.conn, task.id)
    }

    fn visible(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<(Attachment, i64)> {
        let attachment = attachment_db::get_attachment(&pool.conn, id)?;
        let task = task_db::get_task(&pool.conn, attachment.task_id)?;
        let project = project_db::get_project(&pool.conn, task.project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;
        Ok((attachment, project.user_id))
    }

    /// Copy the stored file to `dest`.
    pub fn fetch(pool: &mut DbPool, actor: &Actor, id: i64, dest: &Path) -> AppResult<Attachment> {
        let (attachment, _) = Self::visible(pool, actor, id)?;
        fs::copy(&attachment.stored_path, dest)?;
        Ok(attachment)
    }

    /// Uploader or project owner.
    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let (attachment, owner_id) = Self::visible(pool, actor, id)?;
        if attachment.user_id != actor.id() && owner_id != actor.id() {
            return Err(AppError::Forbidden(format!("you cannot delete attachment #{id}")));
        }

        attachment_db::delete_attachment(&pool.conn, id)?;
        if let Err(e) = fs::remove_file(&attachment.stored_path) {
            crate::ui::messages::warning(format!("Stored file not removed: {e}"));
        }

        audit(&pool.conn, "attach_del", &id.to_string(), &attachment.file_name);
        Ok(())
    }
}
