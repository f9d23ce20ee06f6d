// ── Runtime configuration ──
//
// These types describe *how* to reach the hub and the sink, and how long
// reference data stays fresh. They never touch disk: the binary builds an
// `ExporterConfig` (through `shc-config`) and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use shc_api::{ClientIdentity, TlsMode, TransportConfig};

/// TLS verification strategy for the hub's server certificate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Default: the hub serves a self-signed certificate.
    #[default]
    DangerAcceptInvalid,
}

/// How to reach and authenticate with the hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Hub API root (e.g., `https://192.168.0.10:8444`).
    pub base_url: Url,
    /// Identifier under which the client certificate is registered.
    pub client_id: String,
    /// Human-readable name shown in the hub's client list.
    pub client_name: String,
    /// PEM client certificate.
    pub client_cert: PathBuf,
    /// PEM private key of the client certificate.
    pub client_key: PathBuf,
    pub tls: TlsVerification,
    /// Request timeout. Must outlast the long-poll hold.
    pub timeout: Duration,
}

impl HubConfig {
    /// Translate into the client layer's transport settings.
    pub fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            identity: Some(self.identity()),
        }
    }

    /// The client certificate identity.
    pub fn identity(&self) -> ClientIdentity {
        ClientIdentity::new(&self.client_cert, &self.client_key)
    }
}

/// Freshness windows for the cached reference data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Max age of the room and device lists.
    pub device_interval: Duration,
    /// Max age of the long-poll subscription token.
    pub poll_id_interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            device_interval: Duration::from_secs(10 * 60),
            poll_id_interval: Duration::from_secs(30 * 60),
        }
    }
}

/// Where shaped points are written.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    /// InfluxDB URL (e.g., `http://localhost:8086`).
    pub url: String,
    pub org: String,
    pub bucket: String,
    /// API token with write access to `bucket`.
    pub token: SecretString,
    /// Points buffered before an early flush.
    pub batch_size: usize,
    /// Upper bound on how long a point waits in the buffer.
    pub flush_interval: Duration,
}

/// Everything the exporter needs at runtime.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub hub: HubConfig,
    pub refresh: RefreshConfig,
    pub influx: InfluxConfig,
}
