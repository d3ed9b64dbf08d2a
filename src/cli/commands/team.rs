use super::open_session;
use crate::cli::parser::{Commands, TeamCmd};
use crate::config::Config;
use crate::core::team::TeamLogic;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Team { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        TeamCmd::Add { email, rate } => {
            let m = TeamLogic::add(&mut pool, &actor, email, *rate)?;
            success(format!("{} <{}> joined your team", m.name, m.email));
        }

        TeamCmd::Remove { email } => {
            TeamLogic::remove(&mut pool, &actor, email)?;
            success(format!("{email} removed from your team"));
        }

        TeamCmd::List => {
            let team = TeamLogic::list(&mut pool, &actor)?;
            if team.is_empty() {
                warning("Your team is empty.");
                return Ok(());
            }

            let mut table = Table::new(&["USER", "NAME", "EMAIL", "RATE"]);
            for m in team {
                table.add_row(vec![
                    m.member_id.to_string(),
                    m.name,
                    m.email,
                    colorize_optional(m.hourly_rate.map(|r| format!("{r:.2}")).as_deref()),
                ]);
            }
            table.print(&cfg.separator_char);
        }
    }

    Ok(())
}
