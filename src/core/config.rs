use crate::config::Config;
use crate::config::migrate::{migrate_config, missing_fields};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(path: &Path) -> AppResult<()> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        println!("{}", content);
        Ok(())
    }

    /// Report the fields newer versions expect but the file lacks.
    pub fn check(path: &Path) -> AppResult<Vec<&'static str>> {
        let missing = missing_fields(path)?;
        if missing.is_empty() {
            success("Configuration is up to date.");
        } else {
            warning(format!("Missing fields: {}", missing.join(", ")));
            info("Run `rtimesheet config --migrate` to add them with defaults.");
        }
        Ok(missing)
    }

    pub fn migrate(path: &Path) -> AppResult<()> {
        let added = migrate_config(path)?;
        if added.is_empty() {
            info("Nothing to migrate.");
        } else {
            success(format!("Added: {}", added.join(", ")));
        }
        Ok(())
    }

    pub fn edit(path: &Path, editor: Option<&str>) -> AppResult<()> {
        let ed = editor
            .map(str::to_string)
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| {
                if cfg!(target_os = "windows") {
                    "notepad".into()
                } else {
                    "nano".into()
                }
            });

        let status = Command::new(&ed)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(format!("cannot launch {ed}: {e}")))?;
        if !status.success() {
            return Err(AppError::Config(format!("{ed} exited with {status}")));
        }

        // make sure the edited file still parses
        Config::load()?;
        Ok(())
    }
}
