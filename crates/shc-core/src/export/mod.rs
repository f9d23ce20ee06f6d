// ── Event export dispatch ──
//
// Every event yields one raw point carrying the untyped state. Events whose
// id names a known device service additionally yield a shaped point. A
// shaped decode failure is logged and costs only that one point.

mod influx;
mod point;
mod state;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{trace, warn};

pub use influx::InfluxSink;
pub use point::{FieldValue, MemorySink, Point, PointSink};
pub use state::StateKind;

use crate::error::CoreError;
use crate::model::Event;
use crate::poller::EventSink;

/// Measurement prefix of raw points.
pub const RAW_MEASUREMENT_PREFIX: &str = "raw_";

/// Turns events into points and writes them to a [`PointSink`].
#[derive(Clone)]
pub struct Exporter {
    sink: Arc<dyn PointSink>,
}

impl Exporter {
    pub fn new(sink: Arc<dyn PointSink>) -> Self {
        Self { sink }
    }

    /// Write the raw point and, for known services, the shaped point.
    /// Both carry the export time.
    pub fn export(&self, event: &Event) {
        let now = Utc::now();
        self.sink.write(raw_point(event, now));

        match shaped_point(event, now) {
            Ok(Some(point)) => self.sink.write(point),
            Ok(None) => trace!(id = %event.id, "no shaped export for event"),
            Err(e) => warn!(
                id = %event.id,
                device = %event.device_name(),
                error = %e,
                "error parsing state"
            ),
        }
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").finish_non_exhaustive()
    }
}

impl EventSink for Exporter {
    fn emit(&self, event: Event) {
        self.export(&event);
    }
}

/// `raw_{id}` with every non-null state entry as a field.
pub fn raw_point(event: &Event, ts: DateTime<Utc>) -> Point {
    let mut point = tagged(
        Point::new(format!("{RAW_MEASUREMENT_PREFIX}{}", event.id), ts),
        event,
    );
    for (key, value) in &event.state {
        if let Some(field) = FieldValue::from_json(value) {
            point.fields.insert(key.clone(), field);
        }
    }
    point
}

/// The shaped point for `event`, or `None` when its id has no shape.
pub fn shaped_point(event: &Event, ts: DateTime<Utc>) -> Result<Option<Point>, CoreError> {
    let Some(kind) = StateKind::from_event_id(&event.id) else {
        return Ok(None);
    };
    let point = kind.shape(&event.state, ts)?;
    Ok(Some(tagged(point, event)))
}

fn tagged(point: Point, event: &Event) -> Point {
    point
        .tag("device", event.device_name())
        .tag("room", event.room_name())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    use super::*;
    use crate::model::{Device, Room};

    fn event(id: &str, state: Value) -> Event {
        let room = Arc::new(Room {
            id: "hz_4".into(),
            name: "Schlafzimmer".into(),
        });
        let device = Arc::new(Device {
            id: "hdm:HomeMaticIP:1".into(),
            kind: "device".into(),
            model: "TRV".into(),
            serial: "1".into(),
            name: "Thermostat".into(),
            profile: String::new(),
            room,
        });
        let Value::Object(state) = state else {
            panic!("state must be an object");
        };
        Event {
            id: id.into(),
            kind: "DeviceServiceData".into(),
            path: format!("/devices/hdm:HomeMaticIP:1/services/{id}"),
            device,
            state,
        }
    }

    fn exporter() -> (Exporter, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Exporter::new(sink.clone()), sink)
    }

    #[test]
    fn temperature_event_yields_raw_and_shaped_point() {
        let (exporter, sink) = exporter();
        exporter.export(&event(
            "TemperatureLevel",
            json!({"@type": "temperatureLevelState", "temperature": 25}),
        ));

        let points = sink.points();
        assert_eq!(points.len(), 2);

        let raw = &points[0];
        assert_eq!(raw.measurement, "raw_TemperatureLevel");
        assert_eq!(raw.tags["device"], "Thermostat");
        assert_eq!(raw.tags["room"], "Schlafzimmer");
        assert_eq!(raw.fields["temperature"], FieldValue::Float(25.0));
        assert_eq!(
            raw.fields["@type"],
            FieldValue::Str("temperatureLevelState".into())
        );

        let shaped = &points[1];
        assert_eq!(shaped.measurement, "temperature");
        assert_eq!(shaped.fields["temperature"], FieldValue::Float(25.0));
        assert_eq!(shaped.tags, raw.tags);
        assert_eq!(shaped.timestamp, raw.timestamp);
    }

    #[test]
    fn unknown_id_yields_raw_point_only() {
        let (exporter, sink) = exporter();
        exporter.export(&event("PowerMeter", json!({"powerConsumption": 12.5})));

        let points = sink.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].measurement, "raw_PowerMeter");
    }

    #[test]
    fn decode_failure_still_writes_raw_point() {
        let (exporter, sink) = exporter();
        exporter.export(&event("HumidityLevel", json!({"humidity": "damp"})));

        let points = sink.points();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].measurement, "raw_HumidityLevel");
        assert_eq!(points[0].fields["humidity"], FieldValue::Str("damp".into()));
    }

    #[test]
    fn raw_point_omits_nulls() {
        let point = raw_point(
            &event("ShutterContact", json!({"value": "OPEN", "battery": null})),
            Utc::now(),
        );
        assert_eq!(point.fields.len(), 1);
        assert!(!point.fields.contains_key("battery"));
    }

    #[test]
    fn raw_numbers_keep_one_field_type() {
        let ts = Utc::now();
        let whole = raw_point(&event("TemperatureLevel", json!({"temperature": 25})), ts);
        let fraction = raw_point(&event("TemperatureLevel", json!({"temperature": 25.5})), ts);

        assert_eq!(whole.fields["temperature"], FieldValue::Float(25.0));
        assert_eq!(fraction.fields["temperature"], FieldValue::Float(25.5));
    }

    #[test]
    fn default_device_tags() {
        let mut e = event("ShutterContact", json!({"value": "CLOSED"}));
        e.device = Device::default_device();

        let point = shaped_point(&e, Utc::now()).unwrap().unwrap();
        assert_eq!(point.tags["device"], "default");
        assert_eq!(point.tags["room"], "default");
        assert_eq!(point.fields["open"], FieldValue::Int(0));
    }
}
