//! `rooms` and `devices`: show the reference data the exporter tags points
//! with. Errors are surfaced instead of being swallowed by the caches.

use std::path::Path;
use std::sync::Arc;

use tabled::Tabled;

use shc_api::HubClient;
use shc_config::Config;
use shc_core::resolver::{RoomResolver, join_rooms};
use shc_core::{CoreError, Device, Room};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RoomRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
}

impl From<&Arc<Room>> for RoomRow {
    fn from(r: &Arc<Room>) -> Self {
        Self {
            id: r.id.clone(),
            name: r.name.clone(),
        }
    }
}

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Serial")]
    serial: String,
    #[tabled(rename = "Room")]
    room: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            model: d.model.clone(),
            serial: d.serial.clone(),
            room: d.room.name.clone(),
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

fn client(config: &Config, path: &Path) -> Result<HubClient, CliError> {
    let hub = super::hub_config(config, path)?;
    let client = HubClient::new(hub.base_url.clone(), &hub.transport()).map_err(CoreError::from)?;
    Ok(client)
}

pub async fn rooms(config: &Config, path: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let client = client(config, path)?;
    let rooms = RoomResolver::new(client).fetch().await?;

    let listed: Vec<Arc<Room>> = rooms.iter().filter(|r| !r.is_default()).cloned().collect();
    let out = output::render_list(global.output, &listed, |r| RoomRow::from(r), |r| r.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn devices(config: &Config, path: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let client = client(config, path)?;
    let rooms = RoomResolver::new(client.clone()).fetch().await?;
    let raw = client.list_devices().await.map_err(CoreError::from)?;
    let devices = join_rooms(raw, &rooms);

    let listed: Vec<Arc<Device>> = devices
        .iter()
        .filter(|d| !d.is_default())
        .cloned()
        .collect();
    let out = output::render_list(global.output, &listed, |d| DeviceRow::from(d), |d| d.id.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
