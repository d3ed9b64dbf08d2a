use crate::core::auth::Actor;
use crate::core::validate;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::{projects as project_db, users as user_db};
use crate::errors::{AppError, AppResult};
use crate::models::project::TeamMember;

pub struct TeamLogic;

impl TeamLogic {
    /// Add a registered user to the actor's team (or update their rate).
    pub fn add(pool: &mut DbPool, actor: &Actor, email: &str, hourly_rate: Option<f64>) -> AppResult<TeamMember> {
        let user = user_db::find_by_email(&pool.conn, email)?
            .ok_or_else(|| AppError::not_found("User", email))?;

        if user.id == actor.id() {
            return Err(AppError::validation("member", "you cannot add yourself to your team"));
        }
        let rate = hourly_rate
            .map(|r| validate::non_negative("hourly_rate", r))
            .transpose()?;

        project_db::add_team_member(&pool.conn, actor.id(), user.id, rate)?;
        audit(&pool.conn, "team_add", &user.email, "Added team member");

        Ok(TeamMember {
            owner_id: actor.id(),
            member_id: user.id,
            name: user.name,
            email: user.email,
            hourly_rate: rate,
        })
    }

    pub fn remove(pool: &mut DbPool, actor: &Actor, email: &str) -> AppResult<()> {
        let user = user_db::find_by_email(&pool.conn, email)?
            .ok_or_else(|| AppError::not_found("User", email))?;

        if project_db::remove_team_member(&pool.conn, actor.id(), user.id)? == 0 {
            return Err(AppError::not_found("Team member", &user.email));
        }
        audit(&pool.conn, "team_remove", &user.email, "Removed team member");
        Ok(())
    }

    pub fn list(pool: &mut DbPool, actor: &Actor) -> AppResult<Vec<TeamMember>> {
        project_db::list_team(&pool.conn, actor.id())
    }
}
