// ── Time-series points ──

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// A single field value of a [`Point`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FieldValue {
    /// Convert an untyped state value.
    ///
    /// Every number becomes `Float`, so a field keeps one type whether or not
    /// the hub sent a fractional part. Nested objects and arrays are stored as
    /// their JSON text. `null` yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_f64().map(Self::Float),
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Array(_) | Value::Object(_) => Some(Self::Str(value.to_string())),
        }
    }

    /// Booleans are exported as 1/0 in shaped points.
    pub fn flag(b: bool) -> Self {
        Self::Int(i64::from(b))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

/// A measurement with tags, fields and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: DateTime<Utc>,
}

impl Point {
    pub fn new(measurement: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp,
        }
    }

    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

// ── Sinks ────────────────────────────────────────────────────────────

/// Destination for points.
///
/// `write` must not block: it is called from many concurrently running
/// export tasks and offers no back-pressure. Delivery failures are the
/// sink's to log.
pub trait PointSink: Send + Sync {
    fn write(&self, point: Point);
}

/// Records every point in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    points: Mutex<Vec<Point>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn points(&self) -> Vec<Point> {
        self.points
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Points whose measurement equals `measurement`.
    pub fn measurement(&self, measurement: &str) -> Vec<Point> {
        self.points()
            .into_iter()
            .filter(|p| p.measurement == measurement)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PointSink for MemorySink {
    fn write(&self, point: Point) {
        self.points
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(point);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_conversion() {
        assert_eq!(FieldValue::from_json(&json!(25)), Some(FieldValue::Float(25.0)));
        assert_eq!(FieldValue::from_json(&json!(21.5)), Some(FieldValue::Float(21.5)));
        assert_eq!(FieldValue::from_json(&json!(true)), Some(FieldValue::Bool(true)));
        assert_eq!(
            FieldValue::from_json(&json!("OPEN")),
            Some(FieldValue::Str("OPEN".into()))
        );
        assert_eq!(FieldValue::from_json(&json!(null)), None);
    }

    #[test]
    fn integral_and_fractional_numbers_share_a_type() {
        let whole = FieldValue::from_json(&json!(25)).unwrap();
        let fraction = FieldValue::from_json(&json!(25.5)).unwrap();
        assert_eq!(whole, FieldValue::Float(25.0));
        assert_eq!(fraction, FieldValue::Float(25.5));
        assert_eq!(
            std::mem::discriminant(&whole),
            std::mem::discriminant(&fraction)
        );
    }

    #[test]
    fn nested_values_are_stringified() {
        let value = json!({"profiles": [{"day": "MONDAY"}]});
        assert_eq!(
            FieldValue::from_json(&value),
            Some(FieldValue::Str(r#"{"profiles":[{"day":"MONDAY"}]}"#.into()))
        );
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        let ts = Utc::now();
        sink.write(Point::new("a", ts).field("x", 1_i64));
        sink.write(Point::new("b", ts).tag("room", "Bad"));

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.points()[0].measurement, "a");
        assert_eq!(sink.measurement("b")[0].tags["room"], "Bad");
    }
}
