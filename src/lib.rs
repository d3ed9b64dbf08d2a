//! rTimesheet library root.
//! Exposes the CLI parser, the high-level run() function, and internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    use cli::commands as c;

    let cmd = &cli.command;
    match cmd {
        Commands::Init => c::init::handle(cli),
        Commands::Config { .. } => c::config::handle(cmd, cfg),
        Commands::Db { .. } => c::db::handle(cmd, cfg),
        Commands::Log { .. } => c::log::handle(cmd, cfg),
        Commands::Backup { .. } => c::backup::handle(cmd, cfg),
        Commands::User { .. } => c::user::handle(cli, cfg),
        Commands::Client { .. } => c::client::handle(cmd, cfg),
        Commands::Project { .. } => c::project::handle(cmd, cfg),
        Commands::Team { .. } => c::team::handle(cmd, cfg),
        Commands::Task { .. } => c::task::handle(cmd, cfg),
        Commands::Tasks { .. } => c::task::handle_jobs(cmd, cfg),
        Commands::Time { .. } => c::time::handle(cmd, cfg),
        Commands::Invoice { .. } => c::invoice::handle(cmd, cfg),
        Commands::Note { .. } => c::note::handle(cmd, cfg),
        Commands::Tag { .. } => c::tag::handle(cmd, cfg),
        Commands::Chat { .. } => c::chat::handle(cmd, cfg),
        Commands::Attach { .. } => c::attach::handle(cmd, cfg),
        Commands::Tracker { .. } => c::tracker::handle(cmd, cfg),
        Commands::Dashboard { .. } => c::dashboard::handle(cmd, cfg),
        Commands::Export { .. } => c::export::handle(cmd, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // config is loaded once; command-line overrides win
    let mut cfg = Config::load()?;

    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }
    if let Some(email) = &cli.user {
        cfg.current_user = Some(email.clone());
    }

    dispatch(&cli, &cfg)
}
