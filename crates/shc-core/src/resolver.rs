// ── Reference data resolvers ──
//
// One-shot fetches of the hub's rooms, devices and long-poll subscription.
// Each resolver is the refresh function of its own `TtlCache`; errors are
// returned to the cache, which logs them and keeps serving stale data.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use shc_api::{DeviceResponse, HubClient};

use crate::cache::TtlCache;
use crate::error::CoreError;
use crate::model::{Device, Devices, Room, Rooms};

// ── Rooms ────────────────────────────────────────────────────────────

/// Fetches `GET /smarthome/rooms`.
#[derive(Debug, Clone)]
pub struct RoomResolver {
    client: HubClient,
}

impl RoomResolver {
    pub fn new(client: HubClient) -> Self {
        Self { client }
    }

    /// All rooms, followed by the sentinel default room.
    pub async fn fetch(&self) -> Result<Rooms, CoreError> {
        let raw = self.client.list_rooms().await?;
        let mut rooms: Vec<Arc<Room>> = raw.into_iter().map(|r| Arc::new(Room::from(r))).collect();
        rooms.push(Room::default_room());
        debug!(count = rooms.len(), "fetched rooms");
        Ok(Arc::new(rooms))
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// Fetches `GET /smarthome/devices` and joins every device to its room.
///
/// Rooms are read through their cache on every fetch, so a device refresh
/// always joins against the freshest room list the cache will hand out.
#[derive(Debug, Clone)]
pub struct DeviceResolver {
    client: HubClient,
    rooms: Arc<TtlCache<Rooms>>,
}

impl DeviceResolver {
    pub fn new(client: HubClient, rooms: Arc<TtlCache<Rooms>>) -> Self {
        Self { client, rooms }
    }

    /// All devices whose room is known, followed by the sentinel default
    /// device.
    pub async fn fetch(&self) -> Result<Devices, CoreError> {
        let raw = self.client.list_devices().await?;
        let rooms = self.rooms.get().await;
        let devices = join_rooms(raw, &rooms);
        debug!(count = devices.len(), "fetched devices");
        Ok(devices)
    }
}

/// Attach each device to its room. Devices naming an unknown room are
/// dropped; a device without a room id lands in the default room.
pub fn join_rooms(raw: Vec<DeviceResponse>, rooms: &[Arc<Room>]) -> Devices {
    let by_id: HashMap<&str, &Arc<Room>> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut devices = Vec::with_capacity(raw.len() + 1);
    for d in raw {
        let Some(room) = by_id.get(d.room_id.as_str()) else {
            warn!(device_id = %d.id, room_id = %d.room_id, "cannot find room, dropping device");
            continue;
        };
        devices.push(Arc::new(Device {
            id: d.id,
            kind: d.kind,
            model: d.device_model,
            serial: d.serial,
            name: d.name,
            profile: d.profile,
            room: Arc::clone(room),
        }));
    }
    devices.push(Device::default_device());
    Arc::new(devices)
}

// ── Subscription ─────────────────────────────────────────────────────

/// Subscribes to the hub's remote topics and yields a fresh poll token.
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    client: HubClient,
}

impl SubscriptionManager {
    pub fn new(client: HubClient) -> Self {
        Self { client }
    }

    pub async fn fetch(&self) -> Result<String, CoreError> {
        let token = self.client.subscribe().await?;
        debug!("obtained new poll token");
        Ok(token)
    }
}
