use crate::core::auth::{Actor, ensure_can_view_project, ensure_owns_client};
use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{clients as client_db, notes as note_db, projects as project_db};
use crate::errors::{AppError, AppResult};
use crate::models::note::Note;
use rusqlite::Connection;

#[derive(Debug, Clone, Default)]
pub struct NoteInput {
    pub title: Option<String>,
    pub body: Option<String>,
    pub project_id: Option<i64>,
    pub client_id: Option<i64>,
}

pub struct NoteLogic;

fn check_links(conn: &Connection, actor: &Actor, input: &NoteInput) -> AppResult<()> {
    if let Some(pid) = input.project_id {
        let project = project_db::get_project(conn, pid)?;
        ensure_can_view_project(conn, actor, &project)?;
    }
    if let Some(cid) = input.client_id {
        let client = client_db::get_client(conn, cid)?;
        ensure_owns_client(actor, &client)?;
    }
    Ok(())
}

impl NoteLogic {
    pub fn create(pool: &mut DbPool, actor: &Actor, input: &NoteInput) -> AppResult<Note> {
        let title = validate::non_empty("title", input.title.as_deref().unwrap_or(""))?;
        check_links(&pool.conn, actor, input)?;

        let mut note = Note {
            id: 0,
            user_id: actor.id(),
            project_id: input.project_id,
            client_id: input.client_id,
            title,
            body: input.body.clone().unwrap_or_default(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        note.id = note_db::insert_note(&pool.conn, &note)?;

        audit(&pool.conn, "note_add", &note.id.to_string(), &note.title);
        note_db::get_note(&pool.conn, note.id)
    }

    /// Notes are private to their author.
    pub fn get(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<Note> {
        let note = note_db::get_note(&pool.conn, id)?;
        if note.user_id != actor.id() {
            return Err(AppError::Forbidden(format!("note #{id} belongs to another user")));
        }
        Ok(note)
    }

    pub fn list(
        pool: &mut DbPool,
        actor: &Actor,
        project_id: Option<i64>,
        client_id: Option<i64>,
    ) -> AppResult<Vec<Note>> {
        note_db::list_notes(&pool.conn, actor.id(), project_id, client_id)
    }

    pub fn update(pool: &mut DbPool, actor: &Actor, id: i64, input: &NoteInput) -> AppResult<Note> {
        let mut note = Self::get(pool, actor, id)?;
        check_links(&pool.conn, actor, input)?;

        if let Some(title) = &input.title {
            note.title = validate::non_empty("title", title)?;
        }
        if let Some(body) = &input.body {
            note.body = body.clone();
        }
        if input.project_id.is_some() {
            note.project_id = input.project_id;
        }
        if input.client_id.is_some() {
            note.client_id = input.client_id;
        }

        note_db::update_note(&pool.conn, &note)?;
        audit(&pool.conn, "note_edit", &id.to_string(), &note.title);
        note_db::get_note(&pool.conn, id)
    }

    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let note = Self::get(pool, actor, id)?;
        note_db::delete_note(&pool.conn, id)?;
        audit(&pool.conn, "note_del", &id.to_string(), &note.title);
        Ok(())
    }
}
