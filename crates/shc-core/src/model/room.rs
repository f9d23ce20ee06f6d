use std::sync::{Arc, LazyLock};

use serde::Serialize;

use shc_api::RoomResponse;

static DEFAULT_ROOM: LazyLock<Arc<Room>> = LazyLock::new(|| {
    Arc::new(Room {
        id: String::new(),
        name: "default".into(),
    })
});

/// A room as configured on the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: String,
    pub name: String,
}

impl Room {
    /// Placeholder room with an empty id. Devices without a room id resolve
    /// to it.
    pub fn default_room() -> Arc<Room> {
        Arc::clone(&DEFAULT_ROOM)
    }

    /// Whether this is the placeholder room.
    pub fn is_default(&self) -> bool {
        self.id.is_empty()
    }
}

impl From<RoomResponse> for Room {
    fn from(r: RoomResponse) -> Self {
        Self {
            id: r.id,
            name: r.name,
        }
    }
}
