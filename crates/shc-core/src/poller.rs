// ── Long-poll event loop ──
//
// Blocks on `RE/longPoll` with the current subscription token, enriches every
// result with its device and emits it on a spawned task, so the next poll
// never waits for delivery. The first failed poll stops the loop for good;
// restarting is left to whoever supervises the process.

use std::sync::Arc;

use strum::Display;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, trace, warn};

use shc_api::{HubClient, LONG_POLL_HOLD_SECS, PollResult};

use crate::cache::TtlCache;
use crate::error::CoreError;
use crate::model::{Device, Devices, Event};

/// Receiver of enriched events.
///
/// `emit` is called from spawned tasks, concurrently and in no particular
/// order. It must not block.
pub trait EventSink: Send + Sync + 'static {
    fn emit(&self, event: Event);
}

impl EventSink for mpsc::UnboundedSender<Event> {
    fn emit(&self, event: Event) {
        if self.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }
}

/// Lifecycle of an [`EventPoller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PollerState {
    Running,
    Stopped,
}

/// The long-poll loop.
pub struct EventPoller {
    client: HubClient,
    devices: Arc<TtlCache<Devices>>,
    subscription: Arc<TtlCache<String>>,
    sink: Arc<dyn EventSink>,
    hold_secs: u64,
    state: watch::Sender<PollerState>,
}

impl EventPoller {
    pub fn new(
        client: HubClient,
        devices: Arc<TtlCache<Devices>>,
        subscription: Arc<TtlCache<String>>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let (state, _) = watch::channel(PollerState::Running);
        Self {
            client,
            devices,
            subscription,
            sink,
            hold_secs: LONG_POLL_HOLD_SECS,
            state,
        }
    }

    /// Override the server-side hold requested per poll.
    #[must_use]
    pub fn with_hold_secs(mut self, hold_secs: u64) -> Self {
        self.hold_secs = hold_secs;
        self
    }

    /// Subscribe to state transitions.
    pub fn state(&self) -> watch::Receiver<PollerState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> PollerState {
        *self.state.borrow()
    }

    /// Poll until the first error, which is returned.
    ///
    /// A stopped poller does not start again.
    pub async fn run(&self) -> CoreError {
        if self.current_state() == PollerState::Stopped {
            return CoreError::Protocol {
                message: "long-poll loop already stopped".into(),
                status: None,
            };
        }

        info!(hold_secs = self.hold_secs, "starting long-poll loop");
        loop {
            match self.poll_once().await {
                Ok(count) => trace!(count, "poll cycle complete"),
                Err(e) => {
                    error!(error = %e, "long poll failed, stopping ingestion");
                    self.state.send_replace(PollerState::Stopped);
                    return e;
                }
            }
        }
    }

    /// One long-poll round trip. Returns the number of events emitted.
    pub async fn poll_once(&self) -> Result<usize, CoreError> {
        let token = self.subscription.get().await;
        let results = self.client.long_poll(&token, self.hold_secs).await?;
        if results.is_empty() {
            trace!("long poll returned no changes");
            return Ok(0);
        }

        let devices = self.devices.get().await;
        let count = results.len();
        debug!(count, "received state changes");

        for result in results {
            info!(id = %result.id, device_id = %result.device_id, "received state change");
            let event = enrich(result, &devices);
            let sink = Arc::clone(&self.sink);
            tokio::spawn(async move { sink.emit(event) });
        }
        Ok(count)
    }
}

impl std::fmt::Debug for EventPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPoller")
            .field("hold_secs", &self.hold_secs)
            .field("state", &self.current_state())
            .finish_non_exhaustive()
    }
}

/// Build an event, falling back to the default device for unknown ids.
fn enrich(result: PollResult, devices: &[Arc<Device>]) -> Event {
    let device = devices
        .iter()
        .find(|d| d.id == result.device_id)
        .map_or_else(
            || {
                warn!(device_id = %result.device_id, "unknown device, using default");
                Device::default_device()
            },
            Arc::clone,
        );

    Event {
        id: result.id,
        kind: result.kind,
        path: result.path,
        device,
        state: result.state,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::Room;

    fn result(device_id: &str) -> PollResult {
        serde_json::from_value(json!({
            "path": format!("/devices/{device_id}/services/TemperatureLevel"),
            "@type": "DeviceServiceData",
            "id": "TemperatureLevel",
            "state": {"@type": "temperatureLevelState", "temperature": 19.0},
            "deviceId": device_id,
        }))
        .unwrap()
    }

    fn devices() -> Vec<Arc<Device>> {
        vec![
            Arc::new(Device {
                id: "hdm:HomeMaticIP:1".into(),
                kind: "device".into(),
                model: "TRV".into(),
                serial: "1".into(),
                name: "Thermostat".into(),
                profile: String::new(),
                room: Arc::new(Room {
                    id: "hz_1".into(),
                    name: "Bad".into(),
                }),
            }),
            Device::default_device(),
        ]
    }

    #[test]
    fn enrich_known_device() {
        let event = enrich(result("hdm:HomeMaticIP:1"), &devices());
        assert_eq!(event.device_name(), "Thermostat");
        assert_eq!(event.room_name(), "Bad");
        assert_eq!(event.id, "TemperatureLevel");
        assert_eq!(event.kind, "DeviceServiceData");
    }

    #[test]
    fn enrich_unknown_device_uses_default() {
        let event = enrich(result("hdm:ZigBee:unknown"), &devices());
        assert!(event.device.is_default());
        assert_eq!(event.device_name(), "default");
    }

    #[test]
    fn enrich_with_empty_device_list_uses_default() {
        let event = enrich(result("hdm:HomeMaticIP:1"), &[]);
        assert!(event.device.is_default());
    }

    #[test]
    fn state_display() {
        assert_eq!(PollerState::Running.to_string(), "running");
        assert_eq!(PollerState::Stopped.to_string(), "stopped");
    }
}
