//! Event ingestion pipeline between `shc-api` and a time-series sink.
//!
//! - **[`TtlCache`]**: Memoizes a refresh function for a fixed age. Stale
//!   values keep being served when a refresh fails.
//!
//! - **Resolvers** ([`resolver`]): Rooms, devices (joined to rooms) and the
//!   long-poll subscription token, each fetched on demand through its own
//!   cache.
//!
//! - **[`EventPoller`]**: The long-poll loop. Enriches every state change
//!   with its device and hands it to an [`EventSink`] without waiting for
//!   delivery. Stops for good on the first failed poll.
//!
//! - **[`Exporter`]**: Writes one raw point per event, plus a shaped point
//!   for the state kinds it knows, into a [`PointSink`].
//!
//! - **[`Pipeline`]**: Wires the above together from runtime config.

pub mod cache;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod poller;
pub mod resolver;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::TtlCache;
pub use config::{ExporterConfig, HubConfig, InfluxConfig, RefreshConfig, TlsVerification};
pub use error::CoreError;
pub use export::{Exporter, FieldValue, InfluxSink, MemorySink, Point, PointSink, StateKind};
pub use model::{Device, Devices, Event, Room, Rooms};
pub use pipeline::Pipeline;
pub use poller::{EventPoller, EventSink, PollerState};
