//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use shc_config::ConfigError;
use shc_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const INGESTION_STOPPED: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid configuration ({path})")]
    #[diagnostic(
        code(shc::config),
        help("Check the config file or the SHC_* environment overrides, then run: shc-exporter check-config")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("{message}")]
    #[diagnostic(
        code(shc::setup),
        help("Check the client certificate and key paths under [hub] and that both files are PEM encoded.")
    )]
    Setup { message: String },

    #[error("Invalid log filter '{filter}'")]
    #[diagnostic(
        code(shc::log_filter),
        help("Use a level such as info or debug, or an EnvFilter directive like shc_core=debug.")
    )]
    LogFilter { filter: String },

    // ── Hub ──────────────────────────────────────────────────────────
    #[error("Could not connect to {url}: {reason}")]
    #[diagnostic(
        code(shc::connection_failed),
        help("Check that the hub is powered on and reachable, and that hub.base_url includes the port (usually 8444).")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("The hub rejected the request: {message}")]
    #[diagnostic(
        code(shc::unauthorized),
        help(
            "The client certificate is not trusted yet.\n\
             Press the pairing button on the hub, then run: shc-exporter register"
        )
    )]
    Unauthorized { message: String },

    #[error("Hub error: {message}")]
    #[diagnostic(code(shc::hub_error))]
    Hub { message: String },

    // ── Sink ─────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(shc::sink),
        help("Check influx.url and that the token has write access to influx.bucket.")
    )]
    Sink { message: String },

    // ── Ingestion ────────────────────────────────────────────────────
    #[error("Long-poll loop stopped")]
    #[diagnostic(
        code(shc::ingestion_stopped),
        help("The loop does not retry by itself. Run under a supervisor that restarts it (e.g. systemd Restart=always).")
    )]
    IngestionStopped {
        #[source]
        source: CoreError,
    },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(shc::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } | Self::Setup { .. } | Self::LogFilter { .. } => exit_code::CONFIG,
            Self::Unauthorized { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } | Self::Sink { .. } => exit_code::CONNECTION,
            Self::IngestionStopped { .. } => exit_code::INGESTION_STOPPED,
            Self::Hub { .. } | Self::Io(_) | Self::Json(_) => exit_code::GENERAL,
        }
    }

    pub fn config(path: impl Into<String>, source: ConfigError) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Protocol {
                message,
                status: Some(401 | 403),
            } => CliError::Unauthorized { message },
            CoreError::Protocol { message, .. } => CliError::Hub { message },
            CoreError::Decode { kind, message } => CliError::Hub {
                message: format!("cannot decode {kind}: {message}"),
            },
            CoreError::Sink { message } => CliError::Sink { message },
            CoreError::Config { message } => CliError::Setup { message },
        }
    }
}
