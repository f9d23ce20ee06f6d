// shc-api: Async Rust client for the Smart Home Controller local API (REST + JSON-RPC)

pub mod client;
pub mod error;
pub mod jsonrpc;
pub mod models;
pub mod smarthome;
pub mod transport;

pub use client::HubClient;
pub use error::Error;
pub use jsonrpc::{LONG_POLL_HOLD_SECS, SUBSCRIBE_TOPIC};
pub use models::{ClientResponse, DeviceResponse, PollResult, RoomResponse};
pub use smarthome::Registration;
pub use transport::{ClientIdentity, TlsMode, TransportConfig};
