// Shared transport configuration for building the hub's reqwest::Client.
//
// The hub only talks to registered clients, identified by the TLS client
// certificate they present. It serves a self-signed certificate of its own,
// so verification is relaxed unless a CA file is configured.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::trace;

use crate::error::Error;

/// Default request timeout. Must outlast the hub's 30 s long-poll hold.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// TLS verification mode for the hub's server certificate.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (the hub ships a self-signed one).
    DangerAcceptInvalid,
}

/// PEM files for the client certificate this process registers with the hub.
#[derive(Debug, Clone)]
pub struct ClientIdentity {
    pub cert: PathBuf,
    pub key: PathBuf,
}

impl ClientIdentity {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: cert.into(),
            key: key.into(),
        }
    }

    /// The client certificate as PEM text, as sent in the registration call.
    pub fn certificate_pem(&self) -> Result<String, Error> {
        read_to_string(&self.cert)
    }

    /// Build a reqwest identity from the concatenated certificate and key.
    fn to_identity(&self) -> Result<reqwest::Identity, Error> {
        let mut pem = read(&self.cert)?;
        if !pem.ends_with(b"\n") {
            pem.push(b'\n');
        }
        pem.extend(read(&self.key)?);
        reqwest::Identity::from_pem(&pem)
            .map_err(|e| Error::Tls(format!("invalid client certificate or key: {e}")))
    }
}

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub identity: Option<ClientIdentity>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: DEFAULT_TIMEOUT,
            identity: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("shc-exporter/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = read(path)?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref identity) = self.identity {
            builder = builder.identity(identity.to_identity()?);
            trace!(
                cert = %identity.cert.display(),
                key = %identity.key.display(),
                "using client certificate"
            );
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Attach a client certificate identity.
    pub fn with_identity(mut self, identity: ClientIdentity) -> Self {
        self.identity = Some(identity);
        self
    }
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_to_string(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeout_outlasts_long_poll_hold() {
        let config = TransportConfig::default();
        assert!(config.timeout > Duration::from_secs(crate::LONG_POLL_HOLD_SECS));
        assert!(config.identity.is_none());
    }

    #[test]
    fn missing_certificate_is_io_error() {
        let identity = ClientIdentity::new("/nonexistent/client-cert.pem", "/nonexistent/key.pem");
        let config = TransportConfig::default().with_identity(identity);

        match config.build_client() {
            Err(Error::Io { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/client-cert.pem"));
            }
            other => panic!("expected Io error, got: {other:?}"),
        }
    }

    #[test]
    fn garbage_pem_is_tls_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cert = dir.path().join("cert.pem");
        let key = dir.path().join("key.pem");
        std::fs::write(&cert, "not a certificate").expect("write cert");
        std::fs::write(&key, "not a key").expect("write key");

        let config = TransportConfig::default().with_identity(ClientIdentity::new(cert, key));
        assert!(matches!(config.build_client(), Err(Error::Tls(_))));
    }

    #[test]
    fn certificate_pem_reads_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cert = dir.path().join("cert.pem");
        std::fs::write(&cert, "-----BEGIN CERTIFICATE-----\nabc\n").expect("write cert");

        let identity = ClientIdentity::new(&cert, dir.path().join("key.pem"));
        let pem = identity.certificate_pem().expect("read cert");
        assert!(pem.starts_with("-----BEGIN CERTIFICATE-----"));
    }
}
