//! Configuration for shc-exporter.
//!
//! TOML file plus `SHC_` environment overrides, layered with figment over
//! built-in defaults, validated and translated into
//! [`shc_core::ExporterConfig`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use shc_api::LONG_POLL_HOLD_SECS;
use shc_core::{ExporterConfig, HubConfig, InfluxConfig, RefreshConfig, TlsVerification};

/// Prefix of environment overrides. `__` separates nested keys, e.g.
/// `SHC_HUB__BASE_URL`.
pub const ENV_PREFIX: &str = "SHC_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no InfluxDB token configured (set influx.token, influx.token_env or SHC_INFLUX__TOKEN)")]
    MissingToken,

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn minutes(field: &str, value: u64) -> Result<Duration, ConfigError> {
    value
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| invalid(field, format!("{value} minutes is out of range")))
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub hub: HubSection,

    #[serde(default)]
    pub refresh: RefreshSection,

    #[serde(default)]
    pub influx: InfluxSection,

    /// Default log filter when neither `RUST_LOG` nor `-v` is given.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// `[hub]`: where the controller lives and how we authenticate.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubSection {
    /// Hub API root, e.g. "https://192.168.0.10:8444".
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    #[serde(default = "default_client_name")]
    pub client_name: String,

    /// PEM client certificate presented to the hub.
    #[serde(default = "default_client_cert")]
    pub client_cert: PathBuf,

    /// PEM private key of `client_cert`.
    #[serde(default = "default_client_key")]
    pub client_key: PathBuf,

    /// CA to verify the hub with. Without it any certificate is accepted.
    #[serde(default)]
    pub ca_cert: Option<PathBuf>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HubSection {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            client_id: default_client_id(),
            client_name: default_client_name(),
            client_cert: default_client_cert(),
            client_key: default_client_key(),
            ca_cert: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[refresh]`: freshness windows of the cached reference data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshSection {
    /// Max age of the room and device lists, in minutes.
    #[serde(default = "default_device_update_minutes")]
    pub device_update_minutes: u64,

    /// Max age of the long-poll subscription, in minutes.
    #[serde(default = "default_poll_id_update_minutes")]
    pub poll_id_update_minutes: u64,
}

impl Default for RefreshSection {
    fn default() -> Self {
        Self {
            device_update_minutes: default_device_update_minutes(),
            poll_id_update_minutes: default_poll_id_update_minutes(),
        }
    }
}

/// `[influx]`: the time-series sink.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InfluxSection {
    #[serde(default = "default_influx_url")]
    pub url: String,

    #[serde(default)]
    pub org: String,

    #[serde(default)]
    pub bucket: String,

    /// API token (plaintext; prefer `token_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable holding the API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: u64,
}

impl Default for InfluxSection {
    fn default() -> Self {
        Self {
            url: default_influx_url(),
            org: String::new(),
            bucket: String::new(),
            token: None,
            token_env: None,
            batch_size: default_batch_size(),
            flush_interval_secs: default_flush_interval_secs(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}
fn default_client_id() -> String {
    "oss_shc_exporter".into()
}
fn default_client_name() -> String {
    "OSS SHC Exporter".into()
}
fn default_client_cert() -> PathBuf {
    PathBuf::from("client-cert.pem")
}
fn default_client_key() -> PathBuf {
    PathBuf::from("client-key.pem")
}
fn default_timeout_secs() -> u64 {
    90
}
fn default_device_update_minutes() -> u64 {
    10
}
fn default_poll_id_update_minutes() -> u64 {
    30
}
fn default_influx_url() -> String {
    "http://localhost:8086".into()
}
fn default_batch_size() -> usize {
    100
}
fn default_flush_interval_secs() -> u64 {
    5
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "shc-exporter").map_or_else(
        || PathBuf::from("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Layer defaults, the TOML file at `path` (or [`config_path`]) and the
/// `SHC_` environment.
pub fn layered(path: Option<&Path>) -> Figment {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from file + environment.
///
/// A missing file is not an error; every value then comes from defaults and
/// the environment. An explicitly given path must exist.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(p) = path {
        if !p.is_file() {
            return Err(ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("config file not found: {}", p.display()),
            )));
        }
    }
    let config: Config = layered(path).extract()?;
    Ok(config)
}

// ── Rendering ───────────────────────────────────────────────────────

/// The effective configuration as TOML, with the token blanked out.
pub fn render_redacted(cfg: &Config) -> Result<String, ConfigError> {
    let mut redacted = cfg.clone();
    if redacted.influx.token.is_some() {
        redacted.influx.token = Some("<redacted>".into());
    }
    Ok(toml::to_string_pretty(&redacted)?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the InfluxDB token: `token_env` first, then plaintext `token`.
pub fn resolve_influx_token(influx: &InfluxSection) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = influx.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref token) = influx.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::MissingToken)
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate the hub section alone. Enough for the diagnostic commands
    /// that never touch the sink.
    pub fn hub_config(&self) -> Result<HubConfig, ConfigError> {
        let hub = &self.hub;
        if hub.base_url.trim().is_empty() {
            return Err(invalid("hub.base_url", "must be set"));
        }
        let base_url = Url::parse(&hub.base_url)
            .map_err(|e| invalid("hub.base_url", format!("{e}: {}", hub.base_url)))?;
        if hub.client_id.is_empty() {
            return Err(invalid("hub.client_id", "must not be empty"));
        }
        if hub.timeout_secs <= LONG_POLL_HOLD_SECS {
            return Err(invalid(
                "hub.timeout_secs",
                format!(
                    "must exceed the {LONG_POLL_HOLD_SECS}s long-poll hold, got {}",
                    hub.timeout_secs
                ),
            ));
        }

        let tls = hub
            .ca_cert
            .clone()
            .map_or(TlsVerification::DangerAcceptInvalid, TlsVerification::CustomCa);

        Ok(HubConfig {
            base_url,
            client_id: hub.client_id.clone(),
            client_name: hub.client_name.clone(),
            client_cert: hub.client_cert.clone(),
            client_key: hub.client_key.clone(),
            tls,
            timeout: Duration::from_secs(hub.timeout_secs),
        })
    }

    pub fn refresh_config(&self) -> Result<RefreshConfig, ConfigError> {
        let r = &self.refresh;
        if r.device_update_minutes == 0 {
            return Err(invalid("refresh.device_update_minutes", "must be at least 1"));
        }
        if r.poll_id_update_minutes == 0 {
            return Err(invalid("refresh.poll_id_update_minutes", "must be at least 1"));
        }
        Ok(RefreshConfig {
            device_interval: minutes("refresh.device_update_minutes", r.device_update_minutes)?,
            poll_id_interval: minutes("refresh.poll_id_update_minutes", r.poll_id_update_minutes)?,
        })
    }

    pub fn influx_config(&self) -> Result<InfluxConfig, ConfigError> {
        let i = &self.influx;
        Url::parse(&i.url).map_err(|e| invalid("influx.url", format!("{e}: {}", i.url)))?;
        if i.org.is_empty() {
            return Err(invalid("influx.org", "must be set"));
        }
        if i.bucket.is_empty() {
            return Err(invalid("influx.bucket", "must be set"));
        }
        if i.batch_size == 0 {
            return Err(invalid("influx.batch_size", "must be at least 1"));
        }
        if i.flush_interval_secs == 0 {
            return Err(invalid("influx.flush_interval_secs", "must be at least 1"));
        }
        let token = resolve_influx_token(i)?;

        Ok(InfluxConfig {
            url: i.url.clone(),
            org: i.org.clone(),
            bucket: i.bucket.clone(),
            token,
            batch_size: i.batch_size,
            flush_interval: Duration::from_secs(i.flush_interval_secs),
        })
    }

    /// Validate everything and build the runtime config.
    pub fn to_exporter_config(&self) -> Result<ExporterConfig, ConfigError> {
        Ok(ExporterConfig {
            hub: self.hub_config()?,
            refresh: self.refresh_config()?,
            influx: self.influx_config()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn valid() -> Config {
        let mut cfg = Config::default();
        cfg.hub.base_url = "https://192.168.0.10:8444".into();
        cfg.influx.org = "home".into();
        cfg.influx.bucket = "bosch".into();
        cfg.influx.token = Some("secret".into());
        cfg
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.hub.timeout_secs, 90);
        assert_eq!(cfg.refresh.device_update_minutes, 10);
        assert_eq!(cfg.refresh.poll_id_update_minutes, 30);
        assert_eq!(cfg.influx.batch_size, 100);
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn valid_config_translates() {
        let exporter = valid().to_exporter_config().unwrap();
        assert_eq!(exporter.hub.base_url.as_str(), "https://192.168.0.10:8444/");
        assert_eq!(exporter.hub.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(exporter.refresh.device_interval, Duration::from_secs(600));
        assert_eq!(exporter.refresh.poll_id_interval, Duration::from_secs(1800));
        assert_eq!(exporter.influx.token.expose_secret(), "secret");
    }

    #[test]
    fn ca_cert_enables_verification() {
        let mut cfg = valid();
        cfg.hub.ca_cert = Some(PathBuf::from("/etc/shc/ca.pem"));
        let hub = cfg.hub_config().unwrap();
        assert_eq!(hub.tls, TlsVerification::CustomCa(PathBuf::from("/etc/shc/ca.pem")));
    }

    #[test]
    fn missing_base_url_rejected() {
        let mut cfg = valid();
        cfg.hub.base_url = String::new();
        let err = cfg.to_exporter_config().unwrap_err();
        assert!(err.to_string().contains("hub.base_url"));
    }

    #[test]
    fn timeout_must_outlast_long_poll() {
        let mut cfg = valid();
        cfg.hub.timeout_secs = 30;
        let err = cfg.hub_config().unwrap_err();
        assert!(err.to_string().contains("hub.timeout_secs"));

        cfg.hub.timeout_secs = 31;
        assert!(cfg.hub_config().is_ok());
    }

    #[test]
    fn zero_refresh_interval_rejected() {
        let mut cfg = valid();
        cfg.refresh.poll_id_update_minutes = 0;
        let err = cfg.refresh_config().unwrap_err();
        assert!(err.to_string().contains("poll_id_update_minutes"));
    }

    #[test]
    fn oversized_refresh_interval_rejected() {
        let mut cfg = valid();
        cfg.refresh.device_update_minutes = u64::MAX;
        let err = cfg.refresh_config().unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
        assert!(err.to_string().contains("device_update_minutes"));
    }

    #[test]
    fn missing_token_rejected() {
        let mut cfg = valid();
        cfg.influx.token = None;
        assert!(matches!(
            cfg.influx_config().unwrap_err(),
            ConfigError::MissingToken
        ));
    }

    #[test]
    fn unset_token_env_falls_back_to_plaintext() {
        let mut cfg = valid();
        cfg.influx.token_env = Some("SHC_TEST_TOKEN_THAT_IS_NEVER_SET".into());
        let token = resolve_influx_token(&cfg.influx).unwrap();
        assert_eq!(token.expose_secret(), "secret");
    }

    #[test]
    fn redacted_render_hides_token() {
        let rendered = render_redacted(&valid()).unwrap();
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("base_url = \"https://192.168.0.10:8444\""));
    }
}
