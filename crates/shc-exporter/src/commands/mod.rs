//! Subcommand handlers.

mod check_config;
mod inventory;
mod register;
mod run;

use std::path::Path;

use shc_config::Config;
use shc_core::{HubConfig, RefreshConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    command: Command,
    config: &Config,
    path: &Path,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    tracing::debug!(command = ?command, "dispatching command");
    match command {
        Command::Run(args) => run::handle(args, config, path).await,
        Command::Register => register::handle(config, path, global).await,
        Command::Rooms => inventory::rooms(config, path, global).await,
        Command::Devices => inventory::devices(config, path, global).await,
        Command::CheckConfig => check_config::handle(config, path, global),
    }
}

// ── Shared helpers ──────────────────────────────────────────────────

fn hub_config(config: &Config, path: &Path) -> Result<HubConfig, CliError> {
    config
        .hub_config()
        .map_err(|e| CliError::config(path.display().to_string(), e))
}

fn refresh_config(config: &Config, path: &Path) -> Result<RefreshConfig, CliError> {
    config
        .refresh_config()
        .map_err(|e| CliError::config(path.display().to_string(), e))
}
