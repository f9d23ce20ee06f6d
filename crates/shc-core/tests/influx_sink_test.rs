#![allow(clippy::unwrap_used)]
// Integration tests for `InfluxSink` against a mocked InfluxDB write API.

use std::time::Duration;

use chrono::Utc;
use secrecy::SecretString;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shc_core::{CoreError, InfluxConfig, InfluxSink, Point, PointSink};

fn client(server: &MockServer) -> influxdb2::Client {
    influxdb2::Client::new(server.uri(), "home", "test-token")
}

fn point(measurement: &str, value: f64) -> Point {
    Point::new(measurement, Utc::now())
        .tag("device", "Thermostat")
        .tag("room", "Bad")
        .field("temperature", value)
}

async fn bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

#[tokio::test]
async fn test_full_batch_is_written() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/write"))
        .and(query_param("bucket", "bosch"))
        .and(query_param("org", "home"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (sink, handle) =
        InfluxSink::spawn(client(&server), "bosch".into(), 2, Duration::from_secs(3600));
    sink.write(point("raw_TemperatureLevel", 21.5));
    sink.write(point("temperature", 21.5));
    drop(sink);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    let bodies = bodies(&server).await;
    assert_eq!(bodies.len(), 1);
    assert!(bodies[0].contains("raw_TemperatureLevel"));
    assert!(bodies[0].contains("room=Bad"));
}

#[tokio::test]
async fn test_closing_sink_flushes_partial_batch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/write"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (sink, handle) =
        InfluxSink::spawn(client(&server), "bosch".into(), 100, Duration::from_secs(3600));
    sink.write(point("humidity", 48.0));
    drop(sink);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();

    let bodies = bodies(&server).await;
    assert!(bodies[0].contains("humidity"));
}

#[tokio::test]
async fn test_write_failure_does_not_stop_sink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/write"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(2)
        .mount(&server)
        .await;

    let (sink, handle) =
        InfluxSink::spawn(client(&server), "bosch".into(), 1, Duration::from_secs(3600));
    sink.write(point("temperature", 20.0));
    sink.write(point("temperature", 20.5));
    drop(sink);
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

#[tokio::test]
async fn test_unreachable_server_fails_connect() {
    let config = InfluxConfig {
        url: "http://127.0.0.1:1".into(),
        org: "home".into(),
        bucket: "bosch".into(),
        token: SecretString::from("test-token".to_owned()),
        batch_size: 100,
        flush_interval: Duration::from_secs(5),
    };

    let err = InfluxSink::connect(&config).await.unwrap_err();
    assert!(matches!(err, CoreError::Sink { .. }));
}
