use super::open_session;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        entity,
        format,
        file,
        range,
        force,
    } = cmd
    {
        let (mut pool, actor) = open_session(cfg)?;
        ExportLogic::export(
            &mut pool,
            &actor,
            *entity,
            *format,
            file,
            range.as_deref(),
            *force,
        )?;
    }
    Ok(())
}
