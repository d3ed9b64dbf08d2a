//! Issue tracker synchronisation.
//!
//! A project can be linked to one remote tracker. Syncing pulls the remote
//! issues through an [`IssueTracker`] and upserts them as tasks keyed by
//! `(project, provider, external id)`.

pub mod github;
pub mod jira;

use crate::config::Config;
use crate::core::auth::{Actor, ensure_owns_project};
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{projects as project_db, tasks as task_db, trackers as tracker_db};
use crate::errors::{AppError, AppResult};
use crate::models::task::{Priority, Task, TaskStatus};
use crate::models::tracker::{ExternalIssue, Provider, SyncReport, TrackerLink};
use std::time::Duration;

pub use github::GitHubTracker;
pub use jira::JiraTracker;

/// A remote source of issues.
pub trait IssueTracker {
    fn provider(&self) -> Provider;
    fn fetch_issues(&self) -> AppResult<Vec<ExternalIssue>>;
}

pub(crate) fn http_client() -> AppResult<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_secs(15))
        .timeout(Duration::from_secs(60))
        .user_agent(concat!("rtimesheet/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Turn a non-2xx response into a tracker error carrying the body.
pub(crate) fn check_status(
    response: reqwest::blocking::Response,
) -> AppResult<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .unwrap_or_else(|_| "unable to read response body".to_string());
    Err(AppError::Tracker(format!("HTTP {}: {}", status.as_u16(), body)))
}

pub struct TrackerLogic;

impl TrackerLogic {
    pub fn link(pool: &mut DbPool, actor: &Actor, link: &TrackerLink) -> AppResult<()> {
        let project = project_db::get_project(&pool.conn, link.project_id)?;
        ensure_owns_project(actor, &project)?;

        match link.provider {
            Provider::Github => {
                let valid = link
                    .repository
                    .split_once('/')
                    .is_some_and(|(o, r)| !o.is_empty() && !r.is_empty() && !r.contains('/'));
                if !valid {
                    return Err(AppError::validation("repository", "expected <owner>/<repo>"));
                }
            }
            Provider::Jira => {
                if link.repository.trim().is_empty() {
                    return Err(AppError::validation("repository", "a Jira project key is required"));
                }
                if link.base_url.as_deref().is_none_or(|u| u.trim().is_empty()) {
                    return Err(AppError::validation("base_url", "Jira links need --url"));
                }
            }
        }

        tracker_db::upsert_link(&pool.conn, link)?;
        audit(
            &pool.conn,
            "tracker_link",
            &link.project_id.to_string(),
            &format!("{} {}", link.provider.to_db_str(), link.repository),
        );
        Ok(())
    }

    pub fn unlink(pool: &mut DbPool, actor: &Actor, project_id: i64) -> AppResult<()> {
        let project = project_db::get_project(&pool.conn, project_id)?;
        ensure_owns_project(actor, &project)?;

        if tracker_db::delete_link(&pool.conn, project_id)? == 0 {
            return Err(AppError::not_found("Tracker link", project_id));
        }
        audit(&pool.conn, "tracker_unlink", &project_id.to_string(), "");
        Ok(())
    }

    pub fn linked(pool: &mut DbPool, actor: &Actor, project_id: i64) -> AppResult<TrackerLink> {
        let project = project_db::get_project(&pool.conn, project_id)?;
        ensure_owns_project(actor, &project)?;
        tracker_db::get_link(&pool.conn, project_id)?
            .ok_or_else(|| AppError::not_found("Tracker link", project_id))
    }

    /// Build the HTTP adapter for a stored link.
    pub fn client_for(cfg: &Config, link: &TrackerLink) -> AppResult<Box<dyn IssueTracker>> {
        match link.provider {
            Provider::Github => Ok(Box::new(GitHubTracker::new(
                github::DEFAULT_API,
                &link.repository,
                cfg.github_token(),
            )?)),
            Provider::Jira => {
                let base = link
                    .base_url
                    .as_deref()
                    .ok_or_else(|| AppError::validation("base_url", "Jira links need a base URL"))?;
                let (email, token) = cfg.jira_credentials().ok_or_else(|| {
                    AppError::Config("set jira_email and jira_token (or JIRA_EMAIL/JIRA_TOKEN)".into())
                })?;
                Ok(Box::new(JiraTracker::new(base, &link.repository, email, token)?))
            }
        }
    }

    /// Upsert the remote issues as tasks of the project.
    ///
    /// New open issues become tasks created by and assigned to the actor;
    /// closed issues never seen before are skipped. Known issues get their
    /// title, description and URL refreshed and turn `done` once closed.
    pub fn sync(
        pool: &mut DbPool,
        actor: &Actor,
        project_id: i64,
        tracker: &dyn IssueTracker,
    ) -> AppResult<SyncReport> {
        let project = project_db::get_project(&pool.conn, project_id)?;
        ensure_owns_project(actor, &project)?;

        let issues = tracker.fetch_issues()?;
        let source = tracker.provider().to_db_str();
        let mut report = SyncReport::default();

        let tx = pool.conn.unchecked_transaction()?;
        for issue in issues {
            match task_db::find_external(&tx, project.id, source, &issue.external_id)? {
                Some(mut task) => {
                    let status = if issue.closed { TaskStatus::Done } else { task.status };
                    if task.title == issue.title
                        && task.description == issue.body
                        && task.external_url.as_deref() == Some(issue.url.as_str())
                        && task.status == status
                    {
                        report.skipped += 1;
                        continue;
                    }
                    task.title = issue.title;
                    task.description = issue.body;
                    task.external_url = Some(issue.url);
                    task.status = status;
                    task_db::update_task(&tx, &task)?;
                    report.updated += 1;
                }
                None if issue.closed => report.skipped += 1,
                None => {
                    let task = Task {
                        id: 0,
                        project_id: project.id,
                        created_by: actor.id(),
                        title: issue.title,
                        description: issue.body,
                        status: TaskStatus::Todo,
                        priority: Priority::Medium,
                        due_date: None,
                        is_recurring: false,
                        recurring_frequency: None,
                        recurring_parent_id: None,
                        external_source: Some(source.to_string()),
                        external_id: Some(issue.external_id),
                        external_url: Some(issue.url),
                        created_at: String::new(),
                        updated_at: String::new(),
                    };
                    let id = task_db::insert_task(&tx, &task)?;
                    task_db::set_assignees(&tx, id, &[actor.id()])?;
                    report.created += 1;
                }
            }
        }
        tracker_db::touch_synced(&tx, project.id)?;
        tx.commit()?;

        audit(
            &pool.conn,
            "tracker_sync",
            &project.id.to_string(),
            &format!(
                "{source}: {} created, {} updated, {} skipped",
                report.created, report.updated, report.skipped
            ),
        );
        Ok(report)
    }
}
