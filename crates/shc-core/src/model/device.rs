use std::sync::{Arc, LazyLock};

use serde::Serialize;

use super::Room;

static DEFAULT_DEVICE: LazyLock<Arc<Device>> = LazyLock::new(|| {
    Arc::new(Device {
        id: String::new(),
        kind: "default".into(),
        model: "none".into(),
        serial: String::new(),
        name: "default".into(),
        profile: String::new(),
        room: Room::default_room(),
    })
});

/// A device joined to the room it was assigned to when the device list was
/// fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub id: String,
    /// The hub's `@type`.
    #[serde(rename = "type")]
    pub kind: String,
    pub model: String,
    pub serial: String,
    pub name: String,
    pub profile: String,
    pub room: Arc<Room>,
}

impl Device {
    /// Placeholder for events whose device id is unknown.
    pub fn default_device() -> Arc<Device> {
        Arc::clone(&DEFAULT_DEVICE)
    }

    pub fn is_default(&self) -> bool {
        self.id.is_empty() && self.kind == "default"
    }
}
