//! Acting user resolution and authorization policies.
//!
//! Every operation runs on behalf of an [`Actor`]. Policy checks return
//! `AppError::Forbidden` when the actor may not touch a record.

use crate::db::{projects as project_db, tasks as task_db, users as user_db};
use crate::errors::{AppError, AppResult};
use crate::models::client::Client;
use crate::models::project::Project;
use crate::models::task::Task;
use crate::models::time_log::TimeLog;
use crate::models::user::User;
use rusqlite::Connection;

#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
}

impl Actor {
    pub fn id(&self) -> i64 {
        self.user.id
    }
}

/// Look up the acting user by e-mail.
pub fn resolve_actor(conn: &Connection, email: Option<&str>) -> AppResult<Actor> {
    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(AppError::NoActiveUser)?;

    let user = user_db::find_by_email(conn, email)?
        .ok_or_else(|| AppError::not_found("User", email))?;

    Ok(Actor { user })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRole {
    Owner,
    Member,
}

pub fn project_role(conn: &Connection, project: &Project, user_id: i64) -> AppResult<Option<ProjectRole>> {
    if project.user_id == user_id {
        return Ok(Some(ProjectRole::Owner));
    }
    if project_db::is_member(conn, project.id, user_id)? {
        return Ok(Some(ProjectRole::Member));
    }
    Ok(None)
}

/// Owner or member.
pub fn ensure_can_view_project(conn: &Connection, actor: &Actor, project: &Project) -> AppResult<ProjectRole> {
    project_role(conn, project, actor.id())?.ok_or_else(|| {
        AppError::Forbidden(format!("you are not part of project #{}", project.id))
    })
}

pub fn ensure_owns_project(actor: &Actor, project: &Project) -> AppResult<()> {
    if project.user_id != actor.id() {
        return Err(AppError::Forbidden(format!(
            "only the owner can manage project #{}",
            project.id
        )));
    }
    Ok(())
}

pub fn ensure_owns_client(actor: &Actor, client: &Client) -> AppResult<()> {
    if client.user_id != actor.id() {
        return Err(AppError::Forbidden(format!(
            "client #{} belongs to another user",
            client.id
        )));
    }
    Ok(())
}

/// Project owner, task creator or assignee.
pub fn ensure_can_update_task(
    conn: &Connection,
    actor: &Actor,
    project: &Project,
    task: &Task,
) -> AppResult<()> {
    ensure_can_view_project(conn, actor, project)?;
    if project.user_id == actor.id()
        || task.created_by == actor.id()
        || task_db::is_assignee(conn, task.id, actor.id())?
    {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "you cannot modify task #{}",
        task.id
    )))
}

/// Project owner or task creator.
pub fn ensure_can_delete_task(actor: &Actor, project: &Project, task: &Task) -> AppResult<()> {
    if project.user_id == actor.id() || task.created_by == actor.id() {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "you cannot delete task #{}",
        task.id
    )))
}

/// Author of the log or owner of its project.
pub fn ensure_can_modify_log(actor: &Actor, project: &Project, log: &TimeLog) -> AppResult<()> {
    if log.user_id == actor.id() || project.user_id == actor.id() {
        return Ok(());
    }
    Err(AppError::Forbidden(format!(
        "you cannot modify time log #{}",
        log.id
    )))
}
