// Hub HTTP client
//
// Wraps `reqwest::Client` with hub URL construction, the strict "HTTP 200 or
// nothing" status policy, and body decoding. Endpoint groups (REST entities,
// JSON-RPC) are implemented as inherent methods in separate modules to keep
// this one focused on transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the hub's local API.
///
/// Cheap to clone: the inner `reqwest::Client` is reference counted, so the
/// resolvers and the long-poll loop can each hold their own copy.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HubClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the hub API root, e.g. `https://192.168.0.10:8444`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The hub base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let body = self.send(self.http.get(url.clone()), &url).await?;
        decode(&body)
    }

    /// Send a POST request with a JSON body and decode the JSON answer.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        let answer = self.post_raw(url, body).await?;
        decode(&answer)
    }

    /// Send a POST request with a JSON body, returning the raw answer text.
    pub(crate) async fn post_raw(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        debug!("POST {}", url);
        self.send(self.http.post(url.clone()).json(body), &url).await
    }

    /// Execute a request, insisting on HTTP 200.
    async fn send(&self, builder: reqwest::RequestBuilder, url: &Url) -> Result<String, Error> {
        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;

        trace!(status = status.as_u16(), body = %preview(&body), "hub response");

        if status != reqwest::StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body: preview(&body),
            });
        }

        Ok(body)
    }
}

/// Decode a JSON body, keeping a preview of it in the error.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
