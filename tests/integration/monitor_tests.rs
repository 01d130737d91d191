//! Monitor routes: stats counting and the activity log view.

use serde_json::{json, Value};

use super::test_helpers::spawn_server;

#[tokio::test]
async fn api_calls_are_counted_and_persisted() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let resp = client
            .get(format!("{}/api/monitor/health", server.base_url))
            .send()
            .await
            .expect("health");
        assert_eq!(resp.status(), 200);
    }

    let body: Value = client
        .get(format!("{}/api/monitor/stats", server.base_url))
        .send()
        .await
        .expect("stats")
        .json()
        .await
        .expect("stats body");
    assert_eq!(body["success"], true);
    // 3 health calls plus this stats call itself.
    assert_eq!(body["stats"]["api_calls"], 4);
    assert!(body["stats"]["uptime"].as_i64().is_some());

    // Counters are durable, not process-local.
    let persisted = server.state.stats.load().await.expect("load stats");
    assert_eq!(persisted["system"].api_calls, 4);

    server.ct.cancel();
}

#[tokio::test]
async fn logs_flatten_session_callbacks_newest_first() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let launch: Value = client
        .post(format!("{}/api/training/colab/launch", server.base_url))
        .json(&json!({}))
        .send()
        .await
        .expect("launch")
        .json()
        .await
        .expect("launch body");
    let session_id = launch["session_id"].as_str().expect("session id");

    for status in ["started", "dataset_ready", "training_started"] {
        let resp = client
            .post(format!(
                "{}/api/training/colab/status/{session_id}",
                server.base_url
            ))
            .json(&json!({ "status": status }))
            .send()
            .await
            .expect("callback");
        assert_eq!(resp.status(), 200);
    }

    let body: Value = client
        .get(format!("{}/api/monitor/logs?limit=2", server.base_url))
        .send()
        .await
        .expect("logs")
        .json()
        .await
        .expect("logs body");
    let logs = body["logs"].as_array().expect("logs");
    assert_eq!(logs.len(), 2, "limit must be honored");
    assert_eq!(logs[0]["session_id"], session_id);
    assert_eq!(logs[0]["source"], "colab_callback");

    server.ct.cancel();
}

#[tokio::test]
async fn monitor_clear_cache_acknowledges() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .post(format!("{}/api/monitor/clear-cache", server.base_url))
        .send()
        .await
        .expect("clear")
        .json()
        .await
        .expect("clear body");
    assert_eq!(body["success"], true);

    server.ct.cancel();
}
