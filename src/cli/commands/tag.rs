use super::open_session;
use crate::cli::parser::{Commands, TagCmd};
use crate::config::Config;
use crate::core::tag::TagLogic;
use crate::errors::AppResult;
use crate::ui::messages::warning;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Tag {
        action: TagCmd::List { prefix },
    } = cmd
    {
        let (mut pool, actor) = open_session(cfg)?;
        let tags = TagLogic::autocomplete(&mut pool, &actor, prefix)?;
        if tags.is_empty() {
            warning("No matching tags.");
            return Ok(());
        }

        let mut table = Table::new(&["TAG", "USES"]);
        for t in tags {
            table.add_row(vec![t.name, t.usage.to_string()]);
        }
        table.print(&cfg.separator_char);
    }

    Ok(())
}
