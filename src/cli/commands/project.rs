use super::open_session;
use crate::cli::parser::{Commands, ProjectCmd};
use crate::config::Config;
use crate::core::auth::ProjectRole;
use crate::core::project::ProjectLogic;
use crate::errors::AppResult;
use crate::models::project::ProjectInput;
use crate::ui::messages::{field, header, success, warning};
use crate::utils::colors::{GREY, RESET, colorize_optional};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Project { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        ProjectCmd::Add {
            name,
            client,
            description,
            currency,
            rate,
        } => {
            let input = ProjectInput {
                name: Some(name.clone()),
                client_id: *client,
                description: description.clone(),
                currency: currency.clone(),
                hourly_rate: *rate,
            };
            let p = ProjectLogic::create(&mut pool, cfg, &actor, &input)?;
            success(format!(
                "Project #{} '{}' created ({:.2} {}/h)",
                p.id, p.name, p.hourly_rate, p.currency
            ));
        }

        ProjectCmd::List { archived } => {
            let projects = ProjectLogic::list(&mut pool, &actor, *archived)?;
            if projects.is_empty() {
                warning("No projects found.");
                return Ok(());
            }

            let mut table = Table::new(&["ID", "NAME", "ROLE", "CURRENCY", "RATE", "STATE"]);
            for p in &projects {
                let role = if p.user_id == actor.id() { "owner" } else { "member" };
                let state = if p.archived {
                    format!("{GREY}archived{RESET}")
                } else {
                    "active".to_string()
                };
                table.add_row(vec![
                    p.id.to_string(),
                    p.name.clone(),
                    role.to_string(),
                    p.currency.clone(),
                    format!("{:.2}", p.hourly_rate),
                    state,
                ]);
            }
            table.print(&cfg.separator_char);
        }

        ProjectCmd::Show { id } => {
            let (p, role) = ProjectLogic::get(&mut pool, &actor, *id)?;
            header(format!("Project #{}", p.id));
            field("Name", &p.name);
            field("Description", colorize_optional(p.description.as_deref()));
            field(
                "Client",
                colorize_optional(p.client_id.map(|c| format!("#{c}")).as_deref()),
            );
            field("Currency", &p.currency);
            field("Rate", format!("{:.2}", p.hourly_rate));
            field("Archived", if p.archived { "yes" } else { "no" });
            field(
                "Your role",
                match role {
                    ProjectRole::Owner => "owner",
                    ProjectRole::Member => "member",
                },
            );
        }

        ProjectCmd::Edit {
            id,
            name,
            client,
            description,
            currency,
            rate,
        } => {
            let input = ProjectInput {
                name: name.clone(),
                client_id: *client,
                description: description.clone(),
                currency: currency.clone(),
                hourly_rate: *rate,
            };
            let p = ProjectLogic::update(&mut pool, &actor, *id, &input)?;
            success(format!("Project #{} updated", p.id));
        }

        ProjectCmd::Archive { id } => {
            let p = ProjectLogic::set_archived(&mut pool, &actor, *id, true)?;
            success(format!("Project #{} '{}' archived", p.id, p.name));
        }

        ProjectCmd::Unarchive { id } => {
            let p = ProjectLogic::set_archived(&mut pool, &actor, *id, false)?;
            success(format!("Project #{} '{}' restored", p.id, p.name));
        }

        ProjectCmd::Del { id } => {
            ProjectLogic::delete(&mut pool, &actor, *id)?;
            success(format!("Project #{id} deleted"));
        }

        ProjectCmd::MemberAdd {
            project,
            email,
            rate,
        } => {
            let m = ProjectLogic::add_member(&mut pool, &actor, *project, email, *rate)?;
            success(format!("{} added to project #{}", m.email, m.project_id));
        }

        ProjectCmd::MemberRemove { project, email } => {
            ProjectLogic::remove_member(&mut pool, &actor, *project, email)?;
            success(format!("{email} removed from project #{project}"));
        }

        ProjectCmd::Members { project } => {
            let members = ProjectLogic::members(&mut pool, &actor, *project)?;
            if members.is_empty() {
                warning("The project has no members besides its owner.");
                return Ok(());
            }

            let mut table = Table::new(&["USER", "NAME", "EMAIL", "RATE"]);
            for m in members {
                table.add_row(vec![
                    m.user_id.to_string(),
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
