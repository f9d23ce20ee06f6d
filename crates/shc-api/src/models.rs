// Hub wire models
//
// Shapes of the REST and JSON-RPC payloads exchanged with the hub. Fields use
// `#[serde(default)]` liberally: the hub omits empty fields, and only a few of
// them are load-bearing for the exporter.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── REST: rooms ──────────────────────────────────────────────────────

/// One entry of `GET /smarthome/rooms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    #[serde(rename = "@type", default)]
    pub kind: String,
    pub id: String,
    #[serde(rename = "iconId", default)]
    pub icon_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "extProperties", default)]
    pub ext_properties: Map<String, Value>,
}

// ── REST: devices ────────────────────────────────────────────────────

/// One entry of `GET /smarthome/devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    #[serde(rename = "@type", default)]
    pub kind: String,
    #[serde(default)]
    pub root_device_id: String,
    pub id: String,
    #[serde(default)]
    pub device_service_ids: Vec<String>,
    #[serde(default)]
    pub manufacturer: String,
    /// Absent for devices not assigned to a room (e.g. the controller itself).
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub device_model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub profile: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub child_device_ids: Vec<String>,
}

// ── REST: clients ────────────────────────────────────────────────────

/// One entry of `GET /smarthome/clients` (registered API clients).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    #[serde(rename = "@type", default)]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub primary_role: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub os_version: String,
    #[serde(default)]
    pub app_version: String,
    #[serde(default)]
    pub client_type: String,
    #[serde(default)]
    pub created_date: String,
}

/// Body of `POST /smarthome/clients`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest<'a> {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub id: &'a str,
    pub name: &'a str,
    pub primary_role: &'static str,
    pub certificate: &'a str,
}

// ── JSON-RPC ─────────────────────────────────────────────────────────

/// One call in a JSON-RPC batch. The hub always receives a one-element array.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: Value,
}

/// One answer in a JSON-RPC batch response.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub error: Option<RpcError>,
}

/// The `error` object of a JSON-RPC response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl RpcError {
    /// The hub sometimes sends a zeroed error object alongside a result;
    /// only a populated one means the call failed.
    pub fn is_set(&self) -> bool {
        !self.message.is_empty() || self.code != 0
    }
}

/// One state change delivered by `RE/longPoll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(rename = "@type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_id: String,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
