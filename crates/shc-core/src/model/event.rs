use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::Device;

/// One state change, enriched with the device that reported it.
///
/// Built once per long-poll result and consumed once by export.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Device service id, e.g. `TemperatureLevel`. Selects the export shape.
    pub id: String,
    /// The result's `@type`, e.g. `DeviceServiceData`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Resource path on the hub.
    pub path: String,
    pub device: Arc<Device>,
    pub state: Map<String, Value>,
}

impl Event {
    /// Device name used as the `device` tag.
    pub fn device_name(&self) -> &str {
        &self.device.name
    }

    /// Room name used as the `room` tag.
    pub fn room_name(&self) -> &str {
        &self.device.room.name
    }
}
