// ── Domain model ──
//
// Enriched, immutable snapshots of the hub's reference data. Snapshots are
// replaced wholesale on refresh and shared through `Arc`, so an event built
// from an older snapshot keeps pointing at the room it was joined to.

mod device;
mod event;
mod room;

use std::sync::Arc;

pub use device::Device;
pub use event::Event;
pub use room::Room;

/// One refresh worth of rooms, the sentinel default room last.
pub type Rooms = Arc<Vec<Arc<Room>>>;

/// One refresh worth of devices, the sentinel default device last.
pub type Devices = Arc<Vec<Arc<Device>>>;
