use crate::config::Config;
use crate::core::auth::{Actor, ProjectRole, ensure_can_view_project, ensure_owns_client, ensure_owns_project};
use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{clients as client_db, projects as project_db, users as user_db};
use crate::errors::{AppError, AppResult};
use crate::models::project::{Project, ProjectInput, ProjectMember};

pub struct ProjectLogic;

impl ProjectLogic {
    /// Create a project owned by the actor.
    ///
    /// Currency and rate fall back to the client's values, then to the
    /// configured defaults.
    pub fn create(pool: &mut DbPool, cfg: &Config, actor: &Actor, input: &ProjectInput) -> AppResult<Project> {
        let name = validate::non_empty("name", input.name.as_deref().unwrap_or(""))?;

        let client = match input.client_id {
            Some(cid) => {
                let c = client_db::get_client(&pool.conn, cid)?;
                ensure_owns_client(actor, &c)?;
                Some(c)
            }
            None => None,
        };

        let currency = match (&input.currency, &client) {
            (Some(c), _) => validate::currency(c)?,
            (None, Some(cl)) => cl.currency.clone(),
            (None, None) => validate::currency(&cfg.default_currency)?,
        };

        let hourly_rate = match (input.hourly_rate, &client) {
            (Some(r), _) => validate::non_negative("hourly_rate", r)?,
            (None, Some(cl)) => cl.hourly_rate.unwrap_or(cfg.default_hourly_rate),
            (None, None) => cfg.default_hourly_rate,
        };

        let mut project = Project {
            id: 0,
            user_id: actor.id(),
            client_id: client.map(|c| c.id),
            name,
            description: validate::optional_text(input.description.as_ref()),
            currency,
            hourly_rate,
            archived: false,
            created_at: String::new(),
            updated_at: String::new(),
        };

        project.id = project_db::insert_project(&pool.conn, &project)?;
        audit(&pool.conn, "project_add", &project.id.to_string(), &project.name);
        project_db::get_project(&pool.conn, project.id)
    }

    /// Fetch a project the actor owns or belongs to.
    pub fn get(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<(Project, ProjectRole)> {
        let project = project_db::get_project(&pool.conn, id)?;
        let role = ensure_can_view_project(&pool.conn, actor, &project)?;
        Ok((project, role))
    }

    /// Fetch a project the actor owns.
    pub fn get_owned(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<Project> {
        let project = project_db::get_project(&pool.conn, id)?;
        ensure_owns_project(actor, &project)?;
        Ok(project)
    }

    pub fn list(pool: &mut DbPool, actor: &Actor, include_archived: bool) -> AppResult<Vec<Project>> {
        project_db::list_visible(&pool.conn, actor.id(), include_archived)
    }

    pub fn update(pool: &mut DbPool, actor: &Actor, id: i64, input: &ProjectInput) -> AppResult<Project> {
        let mut project = Self::get_owned(pool, actor, id)?;

        if let Some(name) = &input.name {
            project.name = validate::non_empty("name", name)?;
        }
        if let Some(cid) = input.client_id {
            let c = client_db::get_client(&pool.conn, cid)?;
            ensure_owns_client(actor, &c)?;
            project.client_id = Some(c.id);
        }
        if input.description.is_some() {
            project.description = validate::optional_text(input.description.as_ref());
        }
        if let Some(cur) = &input.currency {
            project.currency = validate::currency(cur)?;
        }
        if let Some(rate) = input.hourly_rate {
            project.hourly_rate = validate::non_negative("hourly_rate", rate)?;
        }

        project_db::update_project(&pool.conn, &project)?;
        audit(&pool.conn, "project_edit", &project.id.to_string(), &project.name);
        project_db::get_project(&pool.conn, id)
    }

    pub fn set_archived(pool: &mut DbPool, actor: &Actor, id: i64, archived: bool) -> AppResult<Project> {
        let mut project = Self::get_owned(pool, actor, id)?;
        project.archived = archived;
        project_db::update_project(&pool.conn, &project)?;

        let op = if archived { "project_archive" } else { "project_unarchive" };
        audit(&pool.conn, op, &project.id.to_string(), &project.name);
        Ok(project)
    }

    pub fn delete(pool: &mut DbPool, actor: &Actor, id: i64) -> AppResult<()> {
        let project = Self::get_owned(pool, actor, id)?;

        let invoiced: i64 = pool.conn.query_row(
            "SELECT COUNT(*) FROM time_logs WHERE project_id = ?1 AND invoice_id IS NOT NULL",
            [id],
            |r| r.get(0),
        )?;
        if invoiced > 0 {
            return Err(AppError::validation(
                "project",
                format!("project #{id} has invoiced time logs; archive it instead"),
            ));
        }

        project_db::delete_project(&pool.conn, id)?;
        audit(&pool.conn, "project_del", &id.to_string(), &project.name);
        Ok(())
    }

    // ---------------------------
    // Membership
    // ---------------------------

    /// Add a team member to the project, optionally with a project rate.
    pub fn add_member(
        pool: &mut DbPool,
        actor: &Actor,
        project_id: i64,
        email: &str,
        hourly_rate: Option<f64>,
    ) -> AppResult<ProjectMember> {
        let project = Self::get_owned(pool, actor, project_id)?;
        let user = user_db::find_by_email(&pool.conn, email)?
            .ok_or_else(|| AppError::not_found("User", email))?;

        if user.id == actor.id() {
            return Err(AppError::validation("member", "the owner is already part of the project"));
        }
        if !project_db::is_team_member(&pool.conn, actor.id(), user.id)? {
            return Err(AppError::validation(
                "member",
                format!("{} is not in your team; run `team add` first", user.email),
            ));
        }
        let rate = hourly_rate
            .map(|r| validate::non_negative("hourly_rate", r))
            .transpose()?;

        project_db::add_member(&pool.conn, project.id, user.id, rate)?;
        audit(
            &pool.conn,
            "project_member_add",
            &project.id.to_string(),
            &format!("Added {} to {}", user.email, project.name),
        );

        Ok(ProjectMember {
            project_id: project.id,
            user_id: user.id,
            name: user.name,
            email: user.email,
            hourly_rate: rate,
        })
    }

    pub fn remove_member(pool: &mut DbPool, actor: &Actor, project_id: i64, email: &str) -> AppResult<()> {
        let project = Self::get_owned(pool, actor, project_id)?;
        let user = user_db::find_by_email(&pool.conn, email)?
            .ok_or_else(|| AppError::not_found("User", email))?;

        if project_db::remove_member(&pool.conn, project.id, user.id)? == 0 {
            return Err(AppError::not_found("Project member", &user.email));
        }
        audit(
            &pool.conn,
            "project_member_remove",
            &project.id.to_string(),
            &format!("Removed {} from {}", user.email, project.name),
        );
        Ok(())
    }

    pub fn members(pool: &mut DbPool, actor: &Actor, project_id: i64) -> AppResult<Vec<ProjectMember>> {
        let (project, _) = Self::get(pool, actor, project_id)?;
        project_db::list_members(&pool.conn, project.id)
    }
}
