//! End-to-end tests against a running server on a random port.

use biography_service::config::BiographyConfig;
use biography_service::services::providers::mock::MockTextProvider;
use biography_service::services::providers::TextProvider;
use biography_service::startup::Application;
use reqwest::Client;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app(provider: Arc<dyn TextProvider>) -> u16 {
    let mut config = BiographyConfig::default();
    config.common.port = 0; // Random port

    let app = Application::build_with_provider(config, provider)
        .await
        .expect("Failed to build application");

    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app(Arc::new(MockTextProvider::returning("bio"))).await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "biography-service");
}

#[tokio::test]
async fn generate_biography_round_trip() {
    let port = spawn_app(Arc::new(MockTextProvider::returning("Pablo Neruda fue..."))).await;

    let response = Client::new()
        .post(format!("http://127.0.0.1:{}/generate-biography", port))
        .json(&json!({ "poetName": "Pablo Neruda" }))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "biography": "Pablo Neruda fue..." }));
}

#[tokio::test]
async fn metrics_endpoint_exposes_relay_counters() {
    let port = spawn_app(Arc::new(MockTextProvider::failing("quota exceeded"))).await;
    let client = Client::new();

    let response = client
        .post(format!("http://127.0.0.1:{}/generate-biography", port))
        .json(&json!({ "poetName": "X" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 500);

    let metrics = client
        .get(format!("http://127.0.0.1:{}/metrics", port))
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .expect("Failed to read body");

    assert!(metrics.contains("biography_requests_total"));
    assert!(metrics.contains("outcome=\"provider_error\""));
}
