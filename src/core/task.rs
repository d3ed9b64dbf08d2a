use crate::core::auth::{
    Actor, ensure_can_delete_task, ensure_can_update_task, ensure_can_view_project,
};
use crate::core::tag::TagLogic;
use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::tasks::{self as task_db, TaskFilter};
use crate::db::{attachments as attachment_db, projects as project_db, tags as tag_db, users as user_db};
use crate::errors::{AppError, AppResult};
use crate::models::attachment::Attachment;
use crate::models::frequency::Frequency;
use crate::models::project::Project;
use crate::models::tag::Taggable;
use crate::models::task::{Priority, Task, TaskInput, TaskStatus};
use crate::models::user::User;
use crate::ui::messages::warning;
use rusqlite::Connection;

/// Task with its assignees, tags and attachments.
#[derive(Debug, Clone)]
pub struct TaskDetails {
    pub task: Task,
    pub assignees: Vec<User>,
    pub tags: Vec<String>,
    pub attachments: Vec<Attachment>,
}

pub struct TaskLogic;

fn parse_frequency(raw: &str) -> AppResult<Frequency> {
    raw.parse::<Frequency>().map_err(|_| {
        AppError::validation(
            "recurring_frequency",
            format!("'{raw}' is not one of daily, weekly, every_other_week, monthly"),
        )
    })
}

/// A recurring task needs both a due date and a cadence.
fn check_recurrence(task: &Task) -> AppResult<()> {
    if task.is_recurring {
        if task.due_date.is_none() {
            return Err(AppError::validation(
                "due_date",
                "a recurring task requires a due date",
            ));
        }
        if task.recurring_frequency.is_none() {
            return Err(AppError::validation(
                "recurring_frequency",
                "a recurring task requires a frequency",
            ));
        }
    }
    Ok(())
}

/// Resolve assignee e-mails and enforce who may be assigned.
///
/// Assignees must be the project owner or a project member. A non-owner may
/// only assign themselves.
fn resolve_assignees(
    conn: &Connection,
    actor: &Actor,
    project: &Project,
    emails: &[String],
) -> AppResult<Vec<i64>> {
    let mut ids = Vec::new();

    for email in emails {
        let user = user_db::find_by_email(conn, email)?.ok_or_else(|| {
            AppError::validation("assignees", format!("unknown user '{email}'"))
        })?;

        if project.user_id != actor.id() && user.id != actor.id() {
            return Err(AppError::validation(
                "assignees",
                "you can only assign yourself to tasks on projects you do not own",
            ));
        }

        if user.id != project.user_id && !project_db::is_member(conn, project.id, user.id)? {
            return Err(AppError::validation(
                "assignees",
                format!("{} is not a member of project #{}", user.email, project.id),
            ));
        }

        if !ids.contains(&user.id) {
            ids.push(user.id);
        }
    }

    Ok(ids)
}

impl TaskLogic {
    pub fn create(pool: &mut DbPool, actor: &Actor, project_id: i64, input: &TaskInput) -> AppResult<Task> {
        let project = project_db::get_project(&pool.conn, project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;

        if project.archived {
            return Err(AppError::validation("project", format!("project #{project_id} is archived")));
        }

        let title = validate::non_empty("title", input.title.as_deref().unwrap_or(""))?;
        let recurring_frequency = input.recurring.as_deref().map(parse_frequency).transpose()?;

        let mut task = Task {
            id: 0,
            project_id: project.id,
            created_by: actor.id(),
            title,
            description: validate::optional_text(input.description.as_ref()),
            status: input.status.unwrap_or(TaskStatus::Todo),
            priority: input.priority.unwrap_or(Priority::Medium),
            due_date: input.due_date,
            is_recurring: recurring_frequency.is_some(),
            recurring_frequency,
            recurring_parent_id: None,
            external_source: None,
            external_id: None,
            external_url: None,
            created_at: String::new(),
            updated_at: String::new(),
        };
        check_recurrence(&task)?;

        let assignee_ids = match &input.assignees {
            Some(emails) if !emails.is_empty() => resolve_assignees(&pool.conn, actor, &project, emails)?,
            _ => vec![actor.id()],
        };

        let tx = pool.conn.unchecked_transaction()?;
        task.id = task_db::insert_task(&tx, &task)?;
        task_db::set_assignees(&tx, task.id, &assignee_ids)?;
        TagLogic::attach_all(&tx, actor.id(), Taggable::Task, task.id, &input.tags)?;
        tx.commit()?;

        audit(&pool.conn, "task_add", &task.id.to_string(), &task.title);
        task_db::get_task(&pool.conn, task.id)
    }

    pub fn details(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<TaskDetails> {
        let task = task_db::get_task(&pool.conn, id)?;
        let project = project_db::get_project(&pool.conn, task.project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;

        Ok(TaskDetails {
            assignees: task_db::assignees(&pool.conn, task.id)?,
            tags: tag_db::names_for(&pool.conn, Taggable::Task, task.id)?,
            attachments: attachment_db::list_for_task(&pool.conn, task.id)?,
            task,
        })
    }

    pub fn list(pool: &mut DbPool, actor: &Actor, filter: &TaskFilter) -> AppResult<Vec<Task>> {
        if let Some(pid) = filter.project_id {
            let project = project_db::get_project(&pool.conn, pid)?;
            ensure_can_view_project(&pool.conn, actor, &project)?;
        }
        task_db::list_tasks(&pool.conn, actor.id(), filter)
    }

    pub fn update(pool: &mut DbPool, actor: &Actor, id: i64, input: &TaskInput) -> AppResult<Task> {
        let mut task = task_db::get_task(&pool.conn, id)?;
        let project = project_db::get_project(&pool.conn, task.project_id)?;
        ensure_can_update_task(&pool.conn, actor, &project, &task)?;

        if let Some(title) = &input.title {
            task.title = validate::non_empty("title", title)?;
        }
        if input.description.is_some() {
            task.description = validate::optional_text(input.description.as_ref());
        }
        if let Some(status) = input.status {
            task.status = status;
        }
        if let Some(priority) = input.priority {
            task.priority = priority;
        }
        if input.due_date.is_some() {
            task.due_date = input.due_date;
        }
        if input.no_recurring {
            task.is_recurring = false;
            task.recurring_frequency = None;
        } else if let Some(raw) = &input.recurring {
            task.recurring_frequency = Some(parse_frequency(raw)?);
            task.is_recurring = true;
        }
        check_recurrence(&task)?;

        let assignee_ids = match &input.assignees {
            Some(emails) => Some(resolve_assignees(&pool.conn, actor, &project, emails)?),
            None => None,
        };

        let tx = pool.conn.unchecked_transaction()?;
        task_db::update_task(&tx, &task)?;
        if let Some(ids) = assignee_ids {
            task_db::set_assignees(&tx, task.id, &ids)?;
        }
        TagLogic::attach_all(&tx, actor.id(), Taggable::Task, task.id, &input.tags)?;
        tx.commit()?;

        audit(&pool.conn, "task_edit", &task.id.to_string(), &task.title);
        task_db::get_task(&pool.conn, id)
    }

    pub fn set_status(pool: &mut DbPool, actor: &Actor, id: i64, status: TaskStatus) -> AppResult<Task> {
        let input = TaskInput {
            status: Some(status),
            ..Default::default()
        };
        Self::update(pool, actor, id, &input)
    }

    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let task = task_db::get_task(&pool.conn, id)?;
        let project = project_db::get_project(&pool.conn, task.project_id)?;
        ensure_can_view_project(&pool.conn, actor, &project)?;
        ensure_can_delete_task(actor, &project, &task)?;

        let stored = attachment_db::list_for_task(&pool.conn, id)?;
        task_db::delete_task(&pool.conn, id)?;

        for a in stored {
            if let Err(e) = std::fs::remove_file(&a.stored_path) {
                warning(format!("Stored file {} not removed: {e}", a.stored_path));
            }
        }

        audit(&pool.conn, "task_del", &id.to_string(), &task.title);
        Ok(())
    }
}
