//! Concurrent-callback handling: the lost-update race is fixed.
//!
//! The store serializes read-modify-write cycles per collection, so two
//! racing callbacks must both leave a log entry.

use serde_json::{json, Value};

use super::test_helpers::spawn_server;

#[tokio::test]
async fn concurrent_callbacks_both_survive() {
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
    let session_id = launch["session_id"].as_str().expect("session id").to_owned();

    let url = format!(
        "{}/api/training/colab/status/{session_id}",
        server.base_url
    );
    let first = client
        .post(&url)
        .json(&json!({ "status": "dataset_ready", "marker": "a" }))
        .send();
    let second = client
        .post(&url)
        .json(&json!({ "status": "model_ready", "marker": "b" }))
        .send();

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.expect("first callback").status(), 200);
    assert_eq!(second.expect("second callback").status(), 200);

    let body: Value = client
        .get(&url)
        .send()
        .await
        .expect("status")
        .json()
        .await
        .expect("status body");
    let logs = body["session"]["logs"].as_array().expect("logs");
    assert_eq!(logs.len(), 2, "neither callback's log entry may be lost");

    let markers: Vec<&str> = logs
        .iter()
        .filter_map(|entry| entry["data"]["marker"].as_str())
        .collect();
    assert!(markers.contains(&"a"));
    assert!(markers.contains(&"b"));

    server.ct.cancel();
}

#[tokio::test]
async fn many_concurrent_callbacks_all_land() {
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
    let session_id = launch["session_id"].as_str().expect("session id").to_owned();
    let url = format!(
        "{}/api/training/colab/status/{session_id}",
        server.base_url
    );

    let mut handles = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            client
                .post(&url)
                .json(&json!({ "status": "training_started", "marker": i }))
                .send()
                .await
        }));
    }
    for handle in handles {
        let resp = handle.await.expect("join").expect("callback");
        assert_eq!(resp.status(), 200);
    }

    let body: Value = client
        .get(&url)
        .send()
        .await
        .expect("status")
        .json()
        .await
        .expect("status body");
    assert_eq!(
        body["session"]["logs"].as_array().expect("logs").len(),
        10,
        "all concurrent callbacks must be recorded"
    );

    server.ct.cancel();
}
