use super::open_session;
use crate::cli::parser::{ChatCmd, Commands};
use crate::config::Config;
use crate::core::chat::ChatLogic;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::colors::{CYAN, GREY, RESET};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Chat { action } = cmd else {
        return Ok(());
    };

    let (mut pool, actor) = open_session(cfg)?;

    match action {
        ChatCmd::Send { project, message } => {
            let id = ChatLogic::send(&mut pool, &actor, *project, message)?;
            success(format!("Message #{id} posted to project #{project}"));
        }

        ChatCmd::List { project, limit } => {
            let messages = ChatLogic::history(&mut pool, &actor, *project, *limit)?;
            if messages.is_empty() {
                info("No messages yet.");
                return Ok(());
            }
            for m in messages {
                println!("{GREY}{}{RESET} {CYAN}{}{RESET}: {}", m.created_at, m.author, m.body);
            }
        }
    }

    Ok(())
}
