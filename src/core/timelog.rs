use crate::core::auth::{Actor, ensure_can_modify_log, ensure_can_view_project, ensure_owns_project};
use crate::core::tag::TagLogic;
use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{projects as project_db, tasks as task_db, time_logs as log_db};
use crate::errors::{AppError, AppResult};
use crate::models::project::Project;
use crate::models::tag::Taggable;
use crate::models::time_log::{ApprovalStatus, TimeLog, TimeLogFilter, TimeLogInput, TimeLogRow};
use crate::utils::time::{minutes_between, now};
use chrono::NaiveDateTime;
use rusqlite::Connection;

pub struct TimeLogLogic;

/// Rate snapshot for a log: project member rate, then the owner's team rate,
/// then the project rate.
pub fn resolve_rate(conn: &Connection, project: &Project, user_id: i64) -> AppResult<f64> {
    if project.user_id == user_id {
        return Ok(project.hourly_rate);
    }
    if let Some(rate) = project_db::member_rate(conn, project.id, user_id)? {
        return Ok(rate);
    }
    if let Some(rate) = project_db::team_rate(conn, project.user_id, user_id)? {
        return Ok(rate);
    }
    Ok(project.hourly_rate)
}

fn check_interval(start: NaiveDateTime, end: NaiveDateTime) -> AppResult<i64> {
    if end <= start {
        return Err(AppError::validation("end_time", "end must be after start"));
    }
    Ok(minutes_between(start, end))
}

fn check_task(conn: &Connection, project_id: i64, task_id: Option<i64>) -> AppResult<()> {
    if let Some(tid) = task_id {
        let task = task_db::get_task(conn, tid)?;
        if task.project_id != project_id {
            return Err(AppError::validation(
                "task_id",
                format!("task #{tid} does not belong to project #{project_id}"),
            ));
        }
    }
    Ok(())
}

fn ensure_not_invoiced(log: &TimeLog) -> AppResult<()> {
    if let Some(inv) = log.invoice_id {
        return Err(AppError::validation(
            "invoice_id",
            format!("time log #{} is billed on invoice #{inv}", log.id),
        ));
    }
    Ok(())
}

fn open_project(conn: &Connection, actor: &Actor, project_id: i64) -> AppResult<Project> {
    let project = project_db::get_project(conn, project_id)?;
    ensure_can_view_project(conn, actor, &project)?;
    if project.archived {
        return Err(AppError::validation(
            "project",
            format!("project #{project_id} is archived"),
        ));
    }
    Ok(project)
}

impl TimeLogLogic {
    fn new_log(
        conn: &Connection,
        actor: &Actor,
        project: &Project,
        input: &TimeLogInput,
        start_time: NaiveDateTime,
    ) -> AppResult<TimeLog> {
        check_task(conn, project.id, input.task_id)?;

        let (end_time, duration_minutes) = match input.end_time {
            Some(end) => (Some(end), Some(check_interval(start_time, end)?)),
            None => (None, None),
        };

        let status = if project.user_id == actor.id() {
            ApprovalStatus::Approved
        } else {
            ApprovalStatus::Pending
        };

        Ok(TimeLog {
            id: 0,
            user_id: actor.id(),
            project_id: project.id,
            task_id: input.task_id,
            description: validate::optional_text(input.description.as_ref()),
            start_time,
            end_time,
            duration_minutes,
            hourly_rate: resolve_rate(conn, project, actor.id())?,
            is_paid: false,
            status,
            invoice_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        })
    }

    fn persist(pool: &mut DbPool, actor: &Actor, log: &TimeLog, tags: &[String], op: &str) -> AppResult<TimeLog> {
        let tx = pool.conn.unchecked_transaction()?;
        let id = log_db::insert_time_log(&tx, log)?;
        TagLogic::attach_all(&tx, actor.id(), Taggable::TimeLog, id, tags)?;
        tx.commit()?;

        audit(&pool.conn, op, &id.to_string(), &format!("project #{}", log.project_id));
        log_db::get_time_log(&pool.conn, id)
    }

    /// Manual entry with both start and end.
    pub fn add(pool: &mut DbPool, actor: &Actor, project_id: i64, input: &TimeLogInput) -> AppResult<TimeLog> {
        let project = open_project(&pool.conn, actor, project_id)?;

        let start = input
            .start_time
            .ok_or_else(|| AppError::validation("start_time", "start time is required"))?;
        if input.end_time.is_none() {
            return Err(AppError::validation("end_time", "end time is required"));
        }

        let log = Self::new_log(&pool.conn, actor, &project, input, start)?;
        Self::persist(pool, actor, &log, &input.tags, "time_add")
    }

    /// Start a timer. At most one timer runs per user.
    pub fn start(pool: &mut DbPool, actor: &Actor, project_id: i64, input: &TimeLogInput) -> AppResult<TimeLog> {
        let project = open_project(&pool.conn, actor, project_id)?;

        if let Some(running) = log_db::running_for_user(&pool.conn, actor.id())? {
            return Err(AppError::validation(
                "timer",
                format!("timer #{} is already running", running.id),
            ));
        }

        let start = input.start_time.unwrap_or_else(now);
        let input = TimeLogInput {
            end_time: None,
            ..input.clone()
        };
        let log = Self::new_log(&pool.conn, actor, &project, &input, start)?;
        Self::persist(pool, actor, &log, &input.tags, "time_start")
    }

    pub fn stop(pool: &mut DbPool, actor: &Actor, at: Option<NaiveDateTime>) -> AppResult<TimeLog> {
        let mut log = log_db::running_for_user(&pool.conn, actor.id())?
            .ok_or_else(|| AppError::validation("timer", "no timer is running"))?;

        let end = at.unwrap_or_else(now);
        // A timer stopped within the same minute still counts one minute.
        let end = if at.is_none() && end <= log.start_time {
            log.start_time + chrono::Duration::minutes(1)
        } else {
            end
        };

        log.duration_minutes = Some(check_interval(log.start_time, end)?);
        log.end_time = Some(end);
        log_db::update_time_log(&pool.conn, &log)?;

        audit(&pool.conn, "time_stop", &log.id.to_string(), &format!("{} min", log.duration_minutes.unwrap_or(0)));
        log_db::get_time_log(&pool.conn, log.id)
    }

    pub fn running(pool: &mut DbPool, actor: &Actor) -> AppResult<Option<TimeLog>> {
        log_db::running_for_user(&pool.conn, actor.id())
    }

    pub fn list(pool: &mut DbPool, actor: &Actor, filter: &TimeLogFilter) -> AppResult<Vec<TimeLogRow>> {
        if let Some(pid) = filter.project_id {
            let project = project_db::get_project(&pool.conn, pid)?;
            ensure_can_view_project(&pool.conn, actor, &project)?;
        }
        log_db::list_time_logs(&pool.conn, actor.id(), filter)
    }

    pub fn get(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<TimeLog> {
        let log = log_db::get_time_log(&pool.conn, id)?;
        let project = project_db::get_project(&pool.conn, log.project_id)?;
        ensure_can_modify_log(actor, &project, &log)?;
        Ok(log)
    }

    /// Edit times, task or description. The rate is taken again from the
    /// current member/team/project rates. A member editing their own log
    /// puts it back into the approval queue.
    pub fn edit(pool: &mut DbPool, actor: &Actor, id: i64, input: &TimeLogInput) -> AppResult<TimeLog> {
        let mut log = log_db::get_time_log(&pool.conn, id)?;
        let project = project_db::get_project(&pool.conn, log.project_id)?;
        ensure_can_modify_log(actor, &project, &log)?;
        ensure_not_invoiced(&log)?;

        if input.task_id.is_some() {
            check_task(&pool.conn, project.id, input.task_id)?;
            log.task_id = input.task_id;
        }
        if input.description.is_some() {
            log.description = validate::optional_text(input.description.as_ref());
        }
        if let Some(start) = input.start_time {
            log.start_time = start;
        }
        if let Some(end) = input.end_time {
            log.end_time = Some(end);
        }
        if let Some(end) = log.end_time {
            log.duration_minutes = Some(check_interval(log.start_time, end)?);
        }

        log.hourly_rate = resolve_rate(&pool.conn, &project, log.user_id)?;
        if project.user_id != actor.id() {
            log.status = ApprovalStatus::Pending;
        }

        let tx = pool.conn.unchecked_transaction()?;
        log_db::update_time_log(&tx, &log)?;
        TagLogic::attach_all(&tx, actor.id(), Taggable::TimeLog, log.id, &input.tags)?;
        tx.commit()?;

        audit(&pool.conn, "time_edit", &id.to_string(), "");
        log_db::get_time_log(&pool.conn, id)
    }

    /// Approve or reject a log; project owner only.
    pub fn review(pool: &mut DbPool, actor: &Actor, id: i64, status: ApprovalStatus) -> AppResult<TimeLog> {
        let mut log = log_db::get_time_log(&pool.conn, id)?;
        let project = project_db::get_project(&pool.conn, log.project_id)?;
        ensure_owns_project(actor, &project)?;
        ensure_not_invoiced(&log)?;

        if log.is_running() {
            return Err(AppError::validation("end_time", "a running timer cannot be reviewed"));
        }

        log.status = status;
        log_db::update_time_log(&pool.conn, &log)?;

        let op = match status {
            ApprovalStatus::Approved => "time_approve",
            ApprovalStatus::Rejected => "time_reject",
            ApprovalStatus::Pending => "time_reopen",
        };
        audit(&pool.conn, op, &id.to_string(), "");
        Ok(log)
    }

    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let log = log_db::get_time_log(&pool.conn, id)?;
        let project = project_db::get_project(&pool.conn, log.project_id)?;
        ensure_can_modify_log(actor, &project, &log)?;
        ensure_not_invoiced(&log)?;

        log_db::delete_time_log(&pool.conn, id)?;
        audit(&pool.conn, "time_del", &id.to_string(), "");
        Ok(())
    }
}
