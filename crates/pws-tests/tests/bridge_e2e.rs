//! End-to-end tests for the upload → dispatch → sink pipeline
//!
//! Each test runs the real router against an in-process mock state-store,
//! uploads readings the way a weather station would, and inspects what the
//! sink actually received.

use std::time::Duration;

use pws_api::{create_router, AppState};
use pws_core::{BridgeConfig, ParameterDefinition, ServerConfig, SinkConfig, Transform};
use pws_sink::testing::{wait_for, SinkRecorder, TestServer};
use pws_sink::SinkClient;
use reqwest::StatusCode;

const WAIT: Duration = Duration::from_secs(2);

fn sensor(
    entity_id: &str,
    inputs: &[&str],
    transform: Option<Transform>,
) -> ParameterDefinition {
    ParameterDefinition {
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        entity_id: entity_id.to_string(),
        name: Some(entity_id.to_string()),
        unit: None,
        icon: None,
        transform,
    }
}

/// A running bridge wired to a recording mock sink.
struct Bridge {
    state: AppState,
    server: TestServer,
    recorder: SinkRecorder,
    _sink_server: TestServer,
}

async fn start_bridge(sensors: Vec<ParameterDefinition>) -> Bridge {
    let recorder = SinkRecorder::new();
    let sink_server = TestServer::start(recorder.router())
        .await
        .expect("mock sink failed to start");

    let config = BridgeConfig {
        server: ServerConfig::default(),
        sink: SinkConfig {
            base_url: sink_server.base_url(),
            token: "test-token".to_string(),
            timeout_secs: 2,
            connect_timeout_secs: 1,
        },
        sensors,
    };
    config.validate().expect("test configuration invalid");

    let sink = SinkClient::with_bearer_token(&config.sink.base_url, &config.sink.token)
        .expect("sink client");
    let state = AppState::new(config, sink);
    let server = TestServer::start(create_router(state.clone()))
        .await
        .expect("bridge failed to start");

    Bridge {
        state,
        server,
        recorder,
        _sink_server: sink_server,
    }
}

/// Upload a reading the way a station does: GET with query parameters.
async fn upload(bridge: &Bridge, query: &str) -> StatusCode {
    let url = format!(
        "{}/weatherstation/updateweatherstation.php?{}",
        bridge.server.base_url(),
        query
    );
    reqwest::get(&url).await.expect("upload request").status()
}

#[tokio::test]
async fn test_temperature_is_converted_and_relayed() {
    let bridge = start_bridge(vec![sensor(
        "pws_temp",
        &["tempf"],
        Some(Transform::FahrenheitToCelsius),
    )])
    .await;

    let status = upload(&bridge, "tempf=98.6").await;
    assert_eq!(status, StatusCode::OK);

    let recorder = bridge.recorder.clone();
    assert!(
        wait_for(
            || {
                let recorder = recorder.clone();
                async move { recorder.count() == 1 }
            },
            WAIT
        )
        .await
    );

    let recorded = bridge.recorder.recorded();
    assert_eq!(recorded[0].entity, "sensor.pws_temp");
    assert_eq!(recorded[0].update.state, "37.0");
    assert_eq!(recorded[0].update.attributes.friendly_name, "pws_temp");
}

#[tokio::test]
async fn test_heat_index_celsius_end_to_end() {
    let bridge = start_bridge(vec![sensor(
        "pws_heat_index",
        &["tempf", "humidity"],
        Some(Transform::HeatIndexCelsius),
    )])
    .await;

    let status = upload(&bridge, "tempf=95&humidity=50").await;
    assert_eq!(status, StatusCode::OK);

    // drain the fire-and-forget update before inspecting the sink
    bridge.state.drain_updates(WAIT).await;

    let recorded = bridge.recorder.recorded();
    assert_eq!(recorded.len(), 1);
    // 95°F / 50% → 105.2°F via the Rothfusz regression → 40.7°C
    assert_eq!(recorded[0].update.state, "40.7");
}

#[tokio::test]
async fn test_missing_input_skips_definition() {
    let bridge = start_bridge(vec![sensor(
        "pws_heat_index",
        &["tempf", "humidity"],
        Some(Transform::HeatIndexCelsius),
    )])
    .await;

    // humidity absent: the upload is still acknowledged, nothing is sent
    let status = upload(&bridge, "tempf=95").await;
    assert_eq!(status, StatusCode::OK);

    bridge.state.drain_updates(WAIT).await;
    assert_eq!(bridge.recorder.count(), 0);
}

#[tokio::test]
async fn test_partially_satisfied_request_dispatches_only_satisfied() {
    let bridge = start_bridge(vec![
        sensor("pws_temp", &["tempf"], Some(Transform::FahrenheitToCelsius)),
        sensor(
            "pws_heat_index",
            &["tempf", "humidity"],
            Some(Transform::HeatIndexCelsius),
        ),
    ])
    .await;

    let status = upload(&bridge, "tempf=98.6&winddir=274").await;
    assert_eq!(status, StatusCode::OK);

    bridge.state.drain_updates(WAIT).await;

    let recorded = bridge.recorder.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].entity, "sensor.pws_temp");
}

#[tokio::test]
async fn test_sink_failure_is_isolated_per_sensor() {
    let bridge = start_bridge(vec![
        sensor("pws_temp", &["tempf"], Some(Transform::FahrenheitToCelsius)),
        sensor(
            "pws_dewpoint",
            &["dewptf"],
            Some(Transform::FahrenheitToCelsius),
        ),
    ])
    .await;

    bridge.recorder.fail_entity("sensor.pws_temp");

    let status = upload(&bridge, "tempf=98.6&dewptf=50").await;
    assert_eq!(status, StatusCode::OK);

    bridge.state.drain_updates(WAIT).await;

    // the failing update is dropped, its sibling still lands
    let recorded = bridge.recorder.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].entity, "sensor.pws_dewpoint");
    assert_eq!(recorded[0].update.state, "10.0");
}

#[tokio::test]
async fn test_unparsable_value_is_contained() {
    let bridge = start_bridge(vec![sensor(
        "pws_temp",
        &["tempf"],
        Some(Transform::FahrenheitToCelsius),
    )])
    .await;

    let status = upload(&bridge, "tempf=warm").await;
    assert_eq!(status, StatusCode::OK);

    bridge.state.drain_updates(WAIT).await;
    assert_eq!(bridge.recorder.count(), 0);
}

#[tokio::test]
async fn test_repeated_upload_produces_identical_payloads() {
    let bridge = start_bridge(vec![sensor(
        "pws_heat_index",
        &["tempf", "humidity"],
        Some(Transform::HeatIndexCelsius),
    )])
    .await;

    assert_eq!(upload(&bridge, "tempf=95&humidity=50").await, StatusCode::OK);
    assert_eq!(upload(&bridge, "tempf=95&humidity=50").await, StatusCode::OK);

    bridge.state.drain_updates(WAIT).await;

    let recorded = bridge.recorder.recorded();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[0].update, recorded[1].update);
}

#[tokio::test]
async fn test_passthrough_sensor_relays_raw_value() {
    let bridge = start_bridge(vec![sensor("pws_wind_dir", &["winddir"], None)]).await;

    let status = upload(&bridge, "winddir=274&tempf=98.6").await;
    assert_eq!(status, StatusCode::OK);

    bridge.state.drain_updates(WAIT).await;

    let recorded = bridge.recorder.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].entity, "sensor.pws_wind_dir");
    assert_eq!(recorded[0].update.state, "274");
}

#[tokio::test]
async fn test_health_endpoint() {
    let bridge = start_bridge(vec![]).await;

    let url = format!("{}/health", bridge.server.base_url());
    let response = reqwest::get(&url).await.expect("health request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.expect("health body"), "OK");
}
