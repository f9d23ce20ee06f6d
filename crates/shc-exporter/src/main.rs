mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, LogFormat};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `RUST_LOG` wins, then `-v`, then the config's `log_level`. Logs go to
/// stderr so command output on stdout stays clean.
fn init_tracing(verbosity: u8, log_level: &str, format: LogFormat) -> Result<(), CliError> {
    let level = match verbosity {
        0 => log_level,
        1 => "debug",
        _ => "trace",
    };

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|_| CliError::LogFilter {
            filter: level.into(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let path = cli
        .global
        .config
        .clone()
        .unwrap_or_else(shc_config::config_path);
    let config = shc_config::load_config(cli.global.config.as_deref())
        .map_err(|e| CliError::config(path.display().to_string(), e))?;

    init_tracing(cli.global.verbose, &config.log_level, cli.global.log_format)?;
    debug!(path = %path.display(), "configuration loaded");

    let command = cli.command.unwrap_or_default();
    commands::dispatch(command, &config, &path, &cli.global).await
}
