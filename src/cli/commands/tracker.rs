use super::open_session;
use crate::cli::parser::{Commands, TrackerCmd};
use crate::config::Config;
use crate::core::tracker::TrackerLogic;
use crate::errors::AppResult;
use crate::models::tracker::TrackerLink;
use crate::ui::messages::{field, header, info, success};
use crate::utils::colors::colorize_optional;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Tracker { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        TrackerCmd::Link {
            project,
            provider,
            repo,
            url,
        } => {
            let link = TrackerLink {
                project_id: *project,
                provider: *provider,
                repository: repo.clone(),
                base_url: url.clone(),
                last_synced_at: None,
            };
            TrackerLogic::link(&mut pool, &actor, &link)?;
            success(format!(
                "Project #{} linked to {} {}",
                project,
                provider.to_db_str(),
                repo
            ));
        }

        TrackerCmd::Unlink { project } => {
            TrackerLogic::unlink(&mut pool, &actor, *project)?;
            success(format!("Project #{project} unlinked"));
        }

        TrackerCmd::Show { project } => {
            let link = TrackerLogic::linked(&mut pool, &actor, *project)?;
            header(format!("Tracker of project #{}", link.project_id));
            field("Provider", link.provider.to_db_str());
            field("Repository", &link.repository);
            field("Base URL", colorize_optional(link.base_url.as_deref()));
            field("Last sync", colorize_optional(link.last_synced_at.as_deref()));
        }

        TrackerCmd::Sync { project } => {
            let link = TrackerLogic::linked(&mut pool, &actor, *project)?;
            let client = TrackerLogic::client_for(cfg, &link)?;
            info(format!(
                "Fetching issues from {} {}…",
                link.provider.to_db_str(),
                link.repository
            ));
            let report = TrackerLogic::sync(&mut pool, &actor, *project, client.as_ref())?;
            success(format!(
                "Sync completed: {} created, {} updated, {} skipped",
                report.created, report.updated, report.skipped
            ));
        }
    }

    Ok(())
}
