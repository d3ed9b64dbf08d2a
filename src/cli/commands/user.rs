use crate::cli::parser::{Cli, Commands, UserCmd};
use crate::config::Config;
use crate::core::auth::resolve_actor;
use crate::core::user::UserLogic;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{field, info, success, warning};
use crate::utils::colors::{GREEN, RESET};
use crate::utils::table::Table;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::User { action } = &cli.command else {
        return Ok(());
    };

    let mut pool = DbPool::open(&cfg.database)?;

    match action {
        UserCmd::Add { name, email } => {
            let user = UserLogic::register(&mut pool, name, email)?;
            success(format!("User #{} registered: {} <{}>", user.id, user.name, user.email));
        }

        UserCmd::List => {
            let users = UserLogic::list(&mut pool)?;
            if users.is_empty() {
                warning("No users registered.");
                return Ok(());
            }

            let current = cfg.current_user.as_deref().unwrap_or_default();
            let mut table = Table::new(&["ID", "NAME", "EMAIL", "CREATED"]);
            for u in users {
                let email = if u.email.eq_ignore_ascii_case(current) {
                    format!("{GREEN}{} *{RESET}", u.email)
                } else {
                    u.email
                };
                table.add_row(vec![u.id.to_string(), u.name, email, u.created_at]);
            }
            table.print(&cfg.separator_char);
        }

        UserCmd::Switch { email } => {
            let user = UserLogic::find(&mut pool, email)?;
            if cli.test {
                info("Test mode: configuration not updated.");
            } else {
                let mut updated = cfg.clone();
                updated.current_user = Some(user.email.clone());
                updated.save()?;
            }
            success(format!("Now acting as {} <{}>", user.name, user.email));
        }

        UserCmd::Whoami => {
            let actor = resolve_actor(&pool.conn, cfg.current_user.as_deref())?;
            field("ID", actor.user.id);
            field("Name", &actor.user.name);
            field("Email", &actor.user.email);
        }
    }

    Ok(())
}
