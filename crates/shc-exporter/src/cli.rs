//! Clap derive structures for the `shc-exporter` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// shc-exporter -- stream Bosch Smart Home Controller state into InfluxDB
#[derive(Debug, Parser)]
#[command(
    name = "shc-exporter",
    version,
    about = "Export Bosch Smart Home Controller state changes to InfluxDB",
    long_about = "Long-polls the Smart Home Controller for state changes, enriches them \
        with device and room names and writes them to InfluxDB.\n\n\
        Without a subcommand, `run` is assumed.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, short = 'c', env = "SHC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for `rooms` and `devices`
    #[arg(
        long,
        short = 'o',
        env = "SHC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Log line format
    #[arg(long, env = "SHC_LOG_FORMAT", default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv); overrides `log_level`
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output Enums ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Register, then stream state changes into InfluxDB (default)
    Run(RunArgs),

    /// Register the client certificate with the hub
    Register,

    /// List the hub's rooms
    Rooms,

    /// List the hub's devices, joined to their rooms
    #[command(alias = "dev")]
    Devices,

    /// Validate the configuration and print the effective values
    CheckConfig,
}

#[derive(Debug, Clone, Copy, Default, Args)]
pub struct RunArgs {
    /// Print points as JSON lines instead of writing to InfluxDB
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the registration check at startup
    #[arg(long)]
    pub skip_register: bool,
}

impl Default for Command {
    fn default() -> Self {
        Self::Run(RunArgs::default())
    }
}
