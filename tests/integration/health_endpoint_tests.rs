//! Integration tests for liveness probes and the API fallback.

use serde_json::Value;

use super::test_helpers::spawn_server;

#[tokio::test]
async fn health_returns_ok() {
    let server = spawn_server().await;

    let resp = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("GET /health");
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.expect("body"), "ok");

    server.ct.cancel();
}

#[tokio::test]
async fn monitor_health_reports_version() {
    let server = spawn_server().await;

    let body: Value = reqwest::get(format!("{}/api/monitor/health", server.base_url))
        .await
        .expect("GET /api/monitor/health")
        .json()
        .await
        .expect("json body");
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].as_str().is_some_and(|v| !v.is_empty()));

    server.ct.cancel();
}

#[tokio::test]
async fn root_serves_the_service_banner() {
    let server = spawn_server().await;

    let body: Value = reqwest::get(&server.base_url)
        .await
        .expect("GET /")
        .json()
        .await
        .expect("json body");
    assert_eq!(body["service"], "nutriscan-dashboard");

    server.ct.cancel();
}

#[tokio::test]
async fn unknown_api_route_returns_structured_not_found() {
    let server = spawn_server().await;

    let resp = reqwest::get(format!("{}/api/no/such/route", server.base_url))
        .await
        .expect("GET unknown");
    assert_eq!(resp.status(), 404);

    let body: Value = resp.json().await.expect("json body");
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "not_found");
    assert!(body["available_endpoints"].is_array());

    server.ct.cancel();
}
