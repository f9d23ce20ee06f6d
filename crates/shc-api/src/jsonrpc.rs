// JSON-RPC endpoints
//
// Both the subscription and the long-poll go through `POST /remote/json-rpc`
// with a one-element batch. The hub answers with a one-element array whose
// entry carries either `result` or `error`.

use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::client::HubClient;
use crate::error::Error;
use crate::models::{PollResult, RpcError, RpcRequest, RpcResponse};

/// Topic pattern registered by `RE/subscribe`.
pub const SUBSCRIBE_TOPIC: &str = "com/bosch/sh/remote/*";

/// Server-side hold time requested from `RE/longPoll`, in seconds.
pub const LONG_POLL_HOLD_SECS: u64 = 30;

const JSON_RPC_PATH: &str = "remote/json-rpc";

impl HubClient {
    /// Register interest in hub topics and return a fresh poll token.
    ///
    /// `POST /remote/json-rpc` with `RE/subscribe`. A new token invalidates
    /// the previous one on the hub side.
    pub async fn subscribe(&self) -> Result<String, Error> {
        debug!(topic = SUBSCRIBE_TOPIC, "creating poll subscription");
        let token: String = self
            .call("RE/subscribe", json!([SUBSCRIBE_TOPIC, null]))
            .await?
            .ok_or_else(|| Error::EmptyResponse {
                method: "RE/subscribe".into(),
            })?;
        info!(poll_id = %token, "created poll subscription");
        Ok(token)
    }

    /// Block on the hub until state changes arrive or the hold expires.
    ///
    /// `POST /remote/json-rpc` with `RE/longPoll`. An expired hold yields an
    /// empty list. A populated `error` object is reported as
    /// [`Error::JsonRpc`].
    pub async fn long_poll(&self, token: &str, hold_secs: u64) -> Result<Vec<PollResult>, Error> {
        debug!(poll_id = token, hold_secs, "polling for changes");
        let results: Option<Vec<PollResult>> =
            self.call("RE/longPoll", json!([token, hold_secs])).await?;
        Ok(results.unwrap_or_default())
    }

    /// Issue a single JSON-RPC call and unwrap the batch envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<Option<T>, Error> {
        let url = self.endpoint(JSON_RPC_PATH)?;
        let request = [RpcRequest {
            jsonrpc: "2.0",
            method,
            params,
        }];

        let responses: Vec<RpcResponse<T>> = self.post(url, &request).await?;
        let response = responses
            .into_iter()
            .next()
            .ok_or_else(|| Error::EmptyResponse {
                method: method.to_owned(),
            })?;

        if let Some(err) = response.error.filter(RpcError::is_set) {
            return Err(Error::JsonRpc {
                code: err.code,
                message: err.message,
            });
        }

        Ok(response.result)
    }
}
