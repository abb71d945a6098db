//! Integration tests for WeatherProvider using wiremock.
//!
//! These tests verify the gateway's outcome mapping against a mock upstream.

use skycast_weather::{WeatherError, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn upstream_body() -> serde_json::Value {
    serde_json::json!({
        "main": {
            "temp": 20.5,
            "feels_like": 19.8,
            "humidity": 65,
            "pressure": 1012
        },
        "weather": [
            {
                "main": "Clear",
                "description": "clear sky"
            }
        ],
        "wind": {
            "speed": 3.6
        },
        "dt": 1615478576
    })
}

fn provider_for(server: &MockServer) -> WeatherProvider {
    WeatherProvider::new(server.uri(), "test-key").unwrap()
}

#[tokio::test]
async fn test_successful_fetch_parses_all_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("q", "London"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(upstream_body()))
        .mount(&mock_server)
        .await;

    let observation = provider_for(&mock_server)
        .fetch_current("London")
        .await
        .unwrap();

    assert_eq!(observation.temperature, 20.5);
    assert_eq!(observation.feels_like, 19.8);
    assert_eq!(observation.humidity, 65);
    assert_eq!(observation.pressure, 1012);
    assert_eq!(observation.condition, "Clear");
    assert_eq!(observation.description, "clear sky");
    assert_eq!(observation.wind_speed, 3.6);
    assert_eq!(observation.observed_at, 1615478576);
}

#[tokio::test]
async fn test_not_found_carries_city_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch_current("NonExistentCity")
        .await
        .unwrap_err();

    match err {
        WeatherError::CityNotFound(city) => assert_eq!(city, "NonExistentCity"),
        other => panic!("expected CityNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_upstream_error_carries_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch_current("London")
        .await
        .unwrap_err();

    match err {
        WeatherError::Upstream(status) => assert_eq!(status, 503),
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_field_is_malformed() {
    let mock_server = MockServer::start().await;

    // Success status but no wind block
    let mut body = upstream_body();
    body.as_object_mut().unwrap().remove("wind");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch_current("London")
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn test_empty_condition_list_is_malformed() {
    let mock_server = MockServer::start().await;

    let mut body = upstream_body();
    body["weather"] = serde_json::json!([]);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let err = provider_for(&mock_server)
        .fetch_current("London")
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_upstream_is_connection_error() {
    // Port 9 (discard) is not listening in the test environment
    let provider = WeatherProvider::new("http://127.0.0.1:9", "test-key").unwrap();

    let err = provider.fetch_current("London").await.unwrap_err();

    assert!(matches!(err, WeatherError::Connection(_)), "got {err:?}");
}
