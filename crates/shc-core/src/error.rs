// ── Core error types ──
//
// The pipeline's error taxonomy: transport, protocol, decode. Resolver errors
// are swallowed by their caches, long-poll errors stop the loop, decode errors
// only cost a single shaped point. The `From<shc_api::Error>` impl sorts
// client-layer errors into the first two families; unusable certificate
// material is a configuration problem.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Hub errors ───────────────────────────────────────────────────
    /// The request never produced a response (connection, TLS, timeout).
    #[error("Cannot reach hub at {url}: {reason}")]
    Transport { url: String, reason: String },

    /// The hub answered with a non-200 status, malformed JSON, or a
    /// JSON-RPC error.
    #[error("Hub protocol error: {message}")]
    Protocol {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Export errors ────────────────────────────────────────────────
    /// A state did not have the shape its event id promised.
    #[error("Cannot decode {kind} state: {message}")]
    Decode { kind: String, message: String },

    /// The time-series sink could not be set up or rejected a point.
    #[error("Time-series sink error: {message}")]
    Sink { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Returns `true` for the transport family.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` for the protocol family.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

// ── Conversion from client-layer errors ──────────────────────────────

impl From<shc_api::Error> for CoreError {
    fn from(err: shc_api::Error) -> Self {
        match err {
            shc_api::Error::Transport(ref e) => CoreError::Transport {
                url: e
                    .url()
                    .map_or_else(|| "<unknown>".into(), ToString::to_string),
                reason: e.to_string(),
            },
            shc_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            shc_api::Error::Tls(reason) => CoreError::Config {
                message: format!("TLS setup failed: {reason}"),
            },
            ref e @ shc_api::Error::Io { .. } => CoreError::Config {
                message: e.to_string(),
            },
            shc_api::Error::Status { status, url, body } => CoreError::Protocol {
                message: format!("HTTP {status} from {url}: {body}"),
                status: Some(status),
            },
            shc_api::Error::Deserialization { message, body: _ } => CoreError::Protocol {
                message: format!("malformed response: {message}"),
                status: None,
            },
            shc_api::Error::JsonRpc { code, message } => CoreError::Protocol {
                message: format!("JSON-RPC error {code}: {message}"),
                status: None,
            },
            shc_api::Error::EmptyResponse { method } => CoreError::Protocol {
                message: format!("JSON-RPC call {method} returned no result"),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_maps_to_protocol() {
        let err = CoreError::from(shc_api::Error::Status {
            status: 500,
            url: "https://hub/smarthome/rooms".into(),
            body: "boom".into(),
        });
        match err {
            CoreError::Protocol { status, message } => {
                assert_eq!(status, Some(500));
                assert!(message.contains("boom"));
            }
            other => panic!("expected Protocol, got: {other:?}"),
        }
    }

    #[test]
    fn json_rpc_maps_to_protocol() {
        let err = CoreError::from(shc_api::Error::JsonRpc {
            code: -32001,
            message: "No subscription".into(),
        });
        assert!(err.is_protocol());
        assert!(err.to_string().contains("No subscription"));
    }

    #[test]
    fn unreadable_certificate_maps_to_config() {
        let err = CoreError::from(shc_api::Error::Io {
            path: "/etc/shc/client-cert.pem".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert!(matches!(err, CoreError::Config { .. }));
        assert!(err.to_string().contains("client-cert.pem"));
    }

    #[test]
    fn tls_setup_maps_to_config() {
        let err = CoreError::from(shc_api::Error::Tls("bad cert".into()));
        assert!(matches!(err, CoreError::Config { .. }));
        assert!(!err.is_transport());
    }
}
