use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::config::ConfigLogic;
use crate::errors::AppResult;
use crate::ui::messages::{error, success};

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, _cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Current configuration:\n");
            ConfigLogic::print(&path)?;
        }

        if *check {
            ConfigLogic::check(&path)?;
        }

        if *migrate {
            ConfigLogic::migrate(&path)?;
        }

        if *edit_config {
            match ConfigLogic::edit(&path, editor.as_deref()) {
                Ok(()) => success("Configuration file edited successfully"),
                Err(e) => {
                    error(format!("Configuration not updated: {e}"));
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
