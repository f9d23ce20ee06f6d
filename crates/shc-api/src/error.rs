use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `shc-api` crate.
///
/// Splits into the two families the ingestion pipeline cares about:
/// transport failures (the request never produced a response) and
/// protocol failures (the hub answered, but not with what we expected).
/// `shc-core` maps these into its own taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, TLS handshake, DNS, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client certificate / CA material could not be turned into a TLS config.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Reading certificate or key material from disk failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Protocol ────────────────────────────────────────────────────
    /// The hub answered with something other than HTTP 200.
    #[error("unexpected HTTP status {status} from {url}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// The JSON-RPC envelope carried an `error` object.
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    /// The JSON-RPC response array was empty or had no `result`.
    #[error("JSON-RPC call {method} returned no result")]
    EmptyResponse { method: String },
}

impl Error {
    /// Returns `true` if the request never got an answer from the hub.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::InvalidUrl(_) | Self::Tls(_) | Self::Io { .. }
        )
    }

    /// Returns `true` if the hub answered but the answer was unusable.
    pub fn is_protocol(&self) -> bool {
        !self.is_transport()
    }

    /// The HTTP status, if the hub answered with a non-200 code.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
