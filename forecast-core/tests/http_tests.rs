//! End-to-end tests of the setup probe and the poll loop against a mock
//! HTTP server, covering status classification and snapshot retention.

use std::time::Duration;

use forecast_core::{
    Coordinator, EntryConfig, EntryRegistry, Location, ProviderId, SensorField, SensorValue,
    SetupError,
    provider::{
        ForecastProvider, accuweather::AccuWeatherProvider, pirateweather::PirateWeatherProvider,
    },
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn accuweather_entry() -> EntryConfig {
    EntryConfig::new(ProviderId::AccuWeather, "SECRET", Location::Key("326257".into()))
}

fn pirateweather_entry() -> EntryConfig {
    EntryConfig::new(
        ProviderId::PirateWeather,
        "SECRET",
        Location::Coordinates { latitude: 52.52, longitude: 13.405 },
    )
}

fn accuweather_payload() -> serde_json::Value {
    serde_json::json!({
        "DailyForecasts": [{
            "Day": {"LongPhrase": "Sunny"},
            "Night": {"LongPhrase": "Clear"},
            "RealFeelTemperature": {"Maximum": {"Value": 21.5}}
        }]
    })
}

fn pirateweather_payload() -> serde_json::Value {
    serde_json::json!({
        "daily": {"data": [{"summary": "Clear", "apparentTemperatureHigh": 18.2}]}
    })
}

// ---------------------------------------------------------------------------
// Setup probe classification
// ---------------------------------------------------------------------------

async fn probe_accuweather_with_status(status: u16) -> Result<(), SetupError> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/326257"))
        .and(query_param("apikey", "SECRET"))
        .and(query_param("details", "true"))
        .and(query_param("metric", "true"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;

    let provider = AccuWeatherProvider::with_endpoint(server.uri());
    provider.probe(&accuweather_entry()).await
}

#[tokio::test]
async fn probe_accepts_http_200() {
    assert!(probe_accuweather_with_status(200).await.is_ok());
}

#[tokio::test]
async fn probe_classifies_401_and_403_as_invalid_auth() {
    assert!(matches!(probe_accuweather_with_status(401).await, Err(SetupError::InvalidAuth)));
    assert!(matches!(probe_accuweather_with_status(403).await, Err(SetupError::InvalidAuth)));
}

#[tokio::test]
async fn probe_classifies_404_as_invalid_location() {
    assert!(matches!(
        probe_accuweather_with_status(404).await,
        Err(SetupError::InvalidLocation)
    ));
}

#[tokio::test]
async fn probe_classifies_other_statuses_as_cannot_connect() {
    assert!(matches!(
        probe_accuweather_with_status(500).await,
        Err(SetupError::CannotConnect(_))
    ));
    assert!(matches!(
        probe_accuweather_with_status(429).await,
        Err(SetupError::CannotConnect(_))
    ));
}

#[tokio::test]
async fn probe_classifies_transport_failure_as_cannot_connect() {
    // Nothing is listening on this port.
    let provider = AccuWeatherProvider::with_endpoint("http://127.0.0.1:9");
    let err = provider.probe(&accuweather_entry()).await.expect_err("must fail");
    assert!(matches!(err, SetupError::CannotConnect(_)));
}

#[tokio::test]
async fn probe_classifies_timeout_as_cannot_connect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(accuweather_payload())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let provider =
        AccuWeatherProvider::with_endpoint(server.uri()).with_timeout(Duration::from_millis(50));
    let err = provider.probe(&accuweather_entry()).await.expect_err("must time out");
    assert!(matches!(err, SetupError::CannotConnect(_)));
}

#[tokio::test]
async fn poll_timeout_fails_and_preserves_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pirateweather_payload()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(pirateweather_payload())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let provider = PirateWeatherProvider::with_endpoint(server.uri())
        .with_timeout(Duration::from_millis(50));
    let coordinator = Coordinator::new(Box::new(provider), pirateweather_entry());

    coordinator.refresh().await.expect("first poll should succeed");
    let before = coordinator.snapshot().expect("snapshot set");

    let err = coordinator.refresh().await.expect_err("delayed response must time out");
    assert!(err.reason.contains("request failed"));

    let after = coordinator.snapshot().expect("snapshot still set");
    assert!(std::sync::Arc::ptr_eq(&before, &after));
}

#[tokio::test]
async fn pirateweather_probe_embeds_key_and_coordinates_in_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/SECRET/52.52,13.405"))
        .and(query_param("units", "si"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pirateweather_payload()))
        .mount(&server)
        .await;

    let provider = PirateWeatherProvider::with_endpoint(server.uri());
    assert!(provider.probe(&pirateweather_entry()).await.is_ok());
}

#[tokio::test]
async fn pirateweather_probe_treats_404_as_cannot_connect() {
    // No location lookup exists on this provider, so 404 is not InvalidLocation.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = PirateWeatherProvider::with_endpoint(server.uri());
    let err = provider.probe(&pirateweather_entry()).await.expect_err("must fail");
    assert!(matches!(err, SetupError::CannotConnect(_)));
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_poll_replaces_snapshot_with_parsed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/326257"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accuweather_payload()))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(
        Box::new(AccuWeatherProvider::with_endpoint(server.uri())),
        accuweather_entry(),
    );
    coordinator.refresh().await.expect("poll should succeed");

    let snapshot = coordinator.snapshot().expect("snapshot must be set");
    assert_eq!(snapshot.day_count(), 1);
    assert_eq!(
        snapshot.field(0, SensorField::DayLongPhrase),
        Some(SensorValue::Text("Sunny".into()))
    );
}

#[tokio::test]
async fn malformed_payload_fails_poll_and_preserves_snapshot() {
    let server = MockServer::start().await;

    // First poll gets a good payload, every later one an empty forecast array.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accuweather_payload()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(
        Box::new(AccuWeatherProvider::with_endpoint(server.uri())),
        accuweather_entry(),
    );

    coordinator.refresh().await.expect("first poll should succeed");
    let before = coordinator.snapshot().expect("snapshot set");

    let err = coordinator.refresh().await.expect_err("empty payload must fail");
    assert!(err.reason.contains("no daily forecasts"));

    let after = coordinator.snapshot().expect("snapshot still set");
    assert!(std::sync::Arc::ptr_eq(&before, &after), "snapshot must be unchanged");
}

#[tokio::test]
async fn non_200_poll_fails_with_status_in_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let coordinator = Coordinator::new(
        Box::new(AccuWeatherProvider::with_endpoint(server.uri())),
        accuweather_entry(),
    );
    let err = coordinator.refresh().await.expect_err("must fail");
    assert!(err.reason.contains("503"));
    assert!(coordinator.snapshot().is_none());
}

// ---------------------------------------------------------------------------
// Full entry flow: setup, sensors, unload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accuweather_entry_sensors_match_scenario_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accuweather_payload()))
        .mount(&server)
        .await;

    let mut registry = EntryRegistry::with_update_interval(Duration::from_secs(3600));
    let handle = registry
        .setup_entry_with(
            Box::new(AccuWeatherProvider::with_endpoint(server.uri())),
            accuweather_entry(),
        )
        .await
        .expect("setup should succeed");

    let value = |field: SensorField, day: usize| {
        handle
            .sensors()
            .iter()
            .find(|s| s.field() == field && s.day_index() == day)
            .expect("sensor exists")
            .value()
    };

    assert_eq!(value(SensorField::DayLongPhrase, 0), Some(SensorValue::Text("Sunny".into())));
    assert_eq!(value(SensorField::NightLongPhrase, 0), Some(SensorValue::Text("Clear".into())));
    assert_eq!(value(SensorField::RealFeelMax, 0), Some(SensorValue::Number(21.5)));

    // The payload only held one day; day 1 sensors all read None.
    assert_eq!(value(SensorField::DayLongPhrase, 1), None);
    assert_eq!(value(SensorField::NightLongPhrase, 1), None);
    assert_eq!(value(SensorField::RealFeelMax, 1), None);

    assert!(registry.unload_entry("326257"));
}

#[tokio::test]
async fn pirateweather_entry_sensors_match_scenario_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pirateweather_payload()))
        .mount(&server)
        .await;

    let mut registry = EntryRegistry::with_update_interval(Duration::from_secs(3600));
    let handle = registry
        .setup_entry_with(
            Box::new(PirateWeatherProvider::with_endpoint(server.uri())),
            pirateweather_entry(),
        )
        .await
        .expect("setup should succeed");

    let value = |field: SensorField, day: usize| {
        handle
            .sensors()
            .iter()
            .find(|s| s.field() == field && s.day_index() == day)
            .expect("sensor exists")
            .value()
    };

    assert_eq!(value(SensorField::Summary, 0), Some(SensorValue::Text("Clear".into())));
    assert_eq!(
        value(SensorField::ApparentTemperatureHigh, 0),
        Some(SensorValue::Number(18.2))
    );
    assert_eq!(value(SensorField::Summary, 7), None);
}

#[tokio::test]
async fn timer_recovers_after_a_failed_poll() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(accuweather_payload()))
        .mount(&server)
        .await;

    let mut registry = EntryRegistry::with_update_interval(Duration::from_millis(20));
    // Initial refresh hits the 500 and fails; the entry must still load.
    let handle = registry
        .setup_entry_with(
            Box::new(AccuWeatherProvider::with_endpoint(server.uri())),
            accuweather_entry(),
        )
        .await
        .expect("setup should succeed despite failed initial refresh");

    let mut rx = handle.coordinator().subscribe();
    assert!(rx.borrow().is_none());

    // Next timer tick succeeds and publishes the snapshot.
    rx.changed().await.expect("coordinator still alive");
    assert!(rx.borrow().is_some());
}
