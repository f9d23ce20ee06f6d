// ── InfluxDB sink ──
//
// Points are handed to a background task over an unbounded channel and
// written in batches, whichever of `batch_size` or `flush_interval` comes
// first. Write failures are logged and the batch is dropped.

use std::time::Duration;

use futures_util::stream;
use influxdb2::Client;
use influxdb2::api::write::TimestampPrecision;
use influxdb2::models::DataPoint;
use secrecy::ExposeSecret;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use super::point::{FieldValue, Point, PointSink};
use crate::config::InfluxConfig;
use crate::error::CoreError;

/// Buffered writer into one InfluxDB bucket.
///
/// Cloning is cheap; every clone feeds the same flush task. The task drains
/// and exits once the last clone is dropped.
#[derive(Debug, Clone)]
pub struct InfluxSink {
    tx: mpsc::UnboundedSender<Point>,
}

impl InfluxSink {
    /// Check that the server is reachable, then start the flush task.
    pub async fn connect(config: &InfluxConfig) -> Result<(Self, JoinHandle<()>), CoreError> {
        let client = Client::new(&config.url, &config.org, config.token.expose_secret());

        client.health().await.map_err(|e| CoreError::Sink {
            message: format!("InfluxDB at {} is not healthy: {e}", config.url),
        })?;
        info!(url = %config.url, bucket = %config.bucket, "connected to InfluxDB");

        Ok(Self::spawn(
            client,
            config.bucket.clone(),
            config.batch_size,
            config.flush_interval,
        ))
    }

    /// Start the flush task without a health check.
    pub fn spawn(
        client: Client,
        bucket: String,
        batch_size: usize,
        flush_interval: Duration,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(flush_loop(
            client,
            bucket,
            rx,
            batch_size.max(1),
            flush_interval,
        ));
        (Self { tx }, handle)
    }
}

impl PointSink for InfluxSink {
    fn write(&self, point: Point) {
        if self.tx.send(point).is_err() {
            warn!("InfluxDB flush task has stopped, dropping point");
        }
    }
}

async fn flush_loop(
    client: Client,
    bucket: String,
    mut rx: mpsc::UnboundedReceiver<Point>,
    batch_size: usize,
    flush_interval: Duration,
) {
    let mut buffer: Vec<Point> = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(point) = received else {
                    flush(&client, &bucket, &mut buffer).await;
                    debug!("InfluxDB sink closed");
                    return;
                };
                buffer.push(point);
                if buffer.len() >= batch_size {
                    flush(&client, &bucket, &mut buffer).await;
                }
            }
            _ = ticker.tick() => flush(&client, &bucket, &mut buffer).await,
        }
    }
}

async fn flush(client: &Client, bucket: &str, buffer: &mut Vec<Point>) {
    if buffer.is_empty() {
        return;
    }
    let points: Vec<DataPoint> = buffer.drain(..).filter_map(to_data_point).collect();
    if points.is_empty() {
        return;
    }

    let count = points.len();
    debug!(count, "flushing points to InfluxDB");
    if let Err(e) = client
        .write_with_precision(bucket, stream::iter(points), TimestampPrecision::Milliseconds)
        .await
    {
        error!(count, error = %e, "failed to write to InfluxDB");
    }
}

/// Line protocol has no empty tag values, and a point needs a field.
fn to_data_point(point: Point) -> Option<DataPoint> {
    let mut builder = DataPoint::builder(point.measurement.as_str());
    for (key, value) in point.tags {
        if !value.is_empty() {
            builder = builder.tag(key, value);
        }
    }
    for (key, value) in point.fields {
        builder = match value {
            FieldValue::Bool(v) => builder.field(key, v),
            FieldValue::Int(v) => builder.field(key, v),
            FieldValue::Float(v) => builder.field(key, v),
            FieldValue::Str(v) => builder.field(key, v),
        };
    }
    match builder
        .timestamp(point.timestamp.timestamp_millis())
        .build()
    {
        Ok(p) => Some(p),
        Err(e) => {
            warn!(measurement = %point.measurement, error = %e, "skipping point");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn point_without_fields_is_skipped() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert!(to_data_point(Point::new("raw_Empty", ts).tag("room", "Bad")).is_none());
    }

    #[test]
    fn point_with_fields_converts() {
        let ts = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let point = Point::new("temperature", ts)
            .tag("device", "Thermostat")
            .tag("room", "")
            .field("temperature", 21.5);
        assert!(to_data_point(point).is_some());
    }
}
