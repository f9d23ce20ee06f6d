// ── Known device service states ──
//
// Typed shapes for the handful of device services that get a shaped point.
// Missing fields decode to their zero value; a field of the wrong JSON type
// is a decode error. Integer fields also accept floats and truncate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use super::point::{FieldValue, Point};
use crate::error::CoreError;

/// Device service ids with a shaped export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum StateKind {
    RoomClimateControl,
    ShutterContact,
    TemperatureLevel,
    HumidityLevel,
    ValveTappet,
}

impl StateKind {
    /// Classify an event id. `None` for services without a shaped export.
    pub fn from_event_id(id: &str) -> Option<Self> {
        id.parse().ok()
    }

    /// Measurement name of the shaped point.
    pub fn measurement(self) -> &'static str {
        match self {
            Self::RoomClimateControl => "room_climate",
            Self::ShutterContact => "shutter_contact",
            Self::TemperatureLevel => "temperature",
            Self::HumidityLevel => "humidity",
            Self::ValveTappet => "valve_tappet",
        }
    }

    /// Decode `state` and build the shaped point, without tags.
    pub fn shape(self, state: &Map<String, Value>, ts: DateTime<Utc>) -> Result<Point, CoreError> {
        let point = Point::new(self.measurement(), ts);
        let point = match self {
            Self::RoomClimateControl => {
                let s: ClimateControlState = decode(self, state)?;
                point
                    .field("setpointTemperature", s.setpoint_temperature)
                    .field(
                        "setpointTemperatureForLevelComfort",
                        s.setpoint_temperature_for_level_comfort,
                    )
                    .field(
                        "setpointTemperatureForLevelEco",
                        s.setpoint_temperature_for_level_eco,
                    )
                    .field("summerMode", FieldValue::flag(s.summer_mode))
                    .field("ventilationMode", FieldValue::flag(s.ventilation_mode))
                    .field("boostMode", FieldValue::flag(s.boost_mode))
                    .field("low", FieldValue::flag(s.low))
            }
            Self::ShutterContact => {
                let s: ShutterContactState = decode(self, state)?;
                point.field("open", FieldValue::flag(s.value == "OPEN"))
            }
            Self::TemperatureLevel => {
                let s: TemperatureLevelState = decode(self, state)?;
                point.field("temperature", s.temperature)
            }
            Self::HumidityLevel => {
                let s: HumidityLevelState = decode(self, state)?;
                point.field("humidity", s.humidity)
            }
            Self::ValveTappet => {
                let s: ValveTappetState = decode(self, state)?;
                point.field("position", s.position)
            }
        };
        Ok(point)
    }
}

fn decode<T: DeserializeOwned>(
    kind: StateKind,
    state: &Map<String, Value>,
) -> Result<T, CoreError> {
    T::deserialize(Value::Object(state.clone())).map_err(|e| CoreError::Decode {
        kind: kind.to_string(),
        message: e.to_string(),
    })
}

// ── Shapes ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ShutterContactState {
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TemperatureLevelState {
    temperature: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HumidityLevelState {
    humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(dead_code)]
struct ValveTappetState {
    #[serde(deserialize_with = "truncated_int")]
    position: i64,
    value: String,
}

/// Read a JSON number into an integer field, dropping any fraction.
#[allow(clippy::cast_possible_truncation)]
fn truncated_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(|v| v.trunc() as i64)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(dead_code, clippy::struct_excessive_bools)]
struct ClimateControlState {
    boost_mode: bool,
    low: bool,
    operation_mode: String,
    room_control_mode: String,
    schedule: Schedule,
    setpoint_temperature: f64,
    setpoint_temperature_for_level_comfort: f64,
    setpoint_temperature_for_level_eco: f64,
    summer_mode: bool,
    supports_boost_mode: bool,
    ventilation_mode: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
#[allow(dead_code)]
struct Schedule {
    profiles: Vec<DayProfile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(dead_code)]
struct DayProfile {
    day: String,
    switch_points: Vec<SwitchPoint>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(dead_code)]
struct SwitchPoint {
    start_time_minutes: i64,
    value: SwitchPointValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(dead_code)]
struct SwitchPointValue {
    temperature_level: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn state(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn classify_event_ids() {
        assert_eq!(
            StateKind::from_event_id("TemperatureLevel"),
            Some(StateKind::TemperatureLevel)
        );
        assert_eq!(StateKind::from_event_id("PowerMeter"), None);
        assert_eq!(StateKind::from_event_id("temperaturelevel"), None);
    }

    #[test]
    fn room_climate_flags_are_numeric() {
        let s = state(json!({
            "@type": "climateControlState",
            "operationMode": "AUTOMATIC",
            "setpointTemperature": 21.5,
            "setpointTemperatureForLevelComfort": 22.0,
            "setpointTemperatureForLevelEco": 17.5,
            "schedule": {
                "profiles": [{
                    "day": "MONDAY",
                    "switchPoints": [{
                        "startTimeMinutes": 360,
                        "value": {"@type": "temperatureLevelSwitchPointValue", "temperatureLevel": "COMFORT"}
                    }]
                }]
            },
            "ventilationMode": false,
            "low": true,
            "boostMode": false,
            "summerMode": false,
            "supportsBoostMode": true,
            "roomControlMode": "HEATING"
        }));

        let p = StateKind::RoomClimateControl.shape(&s, Utc::now()).unwrap();
        assert_eq!(p.measurement, "room_climate");
        assert_eq!(p.fields["setpointTemperature"], FieldValue::Float(21.5));
        assert_eq!(p.fields["setpointTemperatureForLevelEco"], FieldValue::Float(17.5));
        assert_eq!(p.fields["low"], FieldValue::Int(1));
        assert_eq!(p.fields["boostMode"], FieldValue::Int(0));
        assert_eq!(p.fields.len(), 7);
    }

    #[test]
    fn shutter_contact_open() {
        let open = StateKind::ShutterContact
            .shape(&state(json!({"value": "OPEN"})), Utc::now())
            .unwrap();
        let closed = StateKind::ShutterContact
            .shape(&state(json!({"value": "CLOSED"})), Utc::now())
            .unwrap();
        assert_eq!(open.fields["open"], FieldValue::Int(1));
        assert_eq!(closed.fields["open"], FieldValue::Int(0));
    }

    #[test]
    fn integral_temperature_decodes_as_float() {
        let p = StateKind::TemperatureLevel
            .shape(
                &state(json!({"@type": "temperatureLevelState", "temperature": 25})),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(p.fields["temperature"], FieldValue::Float(25.0));
    }

    #[test]
    fn missing_fields_use_zero_values() {
        let p = StateKind::HumidityLevel
            .shape(&state(json!({"@type": "humidityLevelState"})), Utc::now())
            .unwrap();
        assert_eq!(p.fields["humidity"], FieldValue::Float(0.0));
    }

    #[test]
    fn wrong_field_type_is_a_decode_error() {
        let err = StateKind::ValveTappet
            .shape(&state(json!({"position": "wide open"})), Utc::now())
            .unwrap_err();
        match err {
            CoreError::Decode { kind, .. } => assert_eq!(kind, "ValveTappet"),
            other => panic!("expected Decode, got: {other:?}"),
        }
    }

    #[test]
    fn valve_position_is_integer() {
        let p = StateKind::ValveTappet
            .shape(
                &state(json!({"@type": "valveTappetState", "position": 42, "value": "VALVE_ADAPTION_SUCCESSFUL"})),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(p.fields["position"], FieldValue::Int(42));
    }

    #[test]
    fn fractional_valve_position_is_truncated() {
        let p = StateKind::ValveTappet
            .shape(
                &state(json!({"@type": "valveTappetState", "position": 50.7})),
                Utc::now(),
            )
            .unwrap();
        assert_eq!(p.fields["position"], FieldValue::Int(50));
    }
}
