//! End-to-end launch → callback → result scenario.

use serde_json::{json, Value};

use super::test_helpers::spawn_server;

#[tokio::test]
async fn full_training_session_flow() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    // Launch with a partial model config; the rest takes defaults.
    let launch: Value = client
        .post(format!("{}/api/training/colab/launch", server.base_url))
        .json(&json!({
            "model_config": { "model_type": "yolov8n", "epochs": 50 }
        }))
        .send()
        .await
        .expect("launch")
        .json()
        .await
        .expect("launch body");
    assert_eq!(launch["success"], true);
    let session_id = launch["session_id"].as_str().expect("session id").to_owned();
    assert!(launch["template_download_url"]
        .as_str()
        .expect("download url")
        .contains(&session_id));

    // The session is immediately `ready`.
    let status: Value = client
        .get(format!(
            "{}/api/training/colab/status/{session_id}",
            server.base_url
        ))
        .send()
        .await
        .expect("status")
        .json()
        .await
        .expect("status body");
    assert_eq!(status["session"]["status"], "ready");
    assert_eq!(status["session"]["model_config"]["epochs"], 50);
    assert_eq!(status["session"]["dataset_id"], "default_dataset");

    // The rendered notebook is parseable and carries the epoch count.
    let notebook = client
        .get(format!(
            "{}/api/training/colab/template/{session_id}/download",
            server.base_url
        ))
        .send()
        .await
        .expect("download");
    assert_eq!(notebook.status(), 200);
    let raw = notebook.text().await.expect("notebook text");
    assert!(!raw.is_empty());
    let document: Value = serde_json::from_str(&raw).expect("parseable notebook");
    let config_source = document["cells"]
        .as_array()
        .expect("cells")
        .iter()
        .find(|cell| cell["metadata"]["id"] == "config_parameters")
        .expect("config cell")["source"]
        .as_array()
        .expect("source")
        .iter()
        .map(|line| line.as_str().expect("line"))
        .collect::<String>();
    assert!(config_source.contains("\"epochs\": 50,"));

    // First status callback.
    let ack: Value = client
        .post(format!(
            "{}/api/training/colab/status/{session_id}",
            server.base_url
        ))
        .json(&json!({ "status": "training_started" }))
        .send()
        .await
        .expect("callback")
        .json()
        .await
        .expect("callback body");
    assert_eq!(ack["success"], true);

    let status: Value = client
        .get(format!(
            "{}/api/training/colab/status/{session_id}",
            server.base_url
        ))
        .send()
        .await
        .expect("status")
        .json()
        .await
        .expect("status body");
    assert_eq!(status["session"]["status"], "training_started");
    assert_eq!(status["session"]["logs"].as_array().expect("logs").len(), 1);

    // Final result.
    let ack: Value = client
        .post(format!("{}/api/training/colab/result", server.base_url))
        .json(&json!({
            "session_id": session_id,
            "status": "completed",
            "summary": { "model_results": { "metrics": { "accuracy": 0.9 } } }
        }))
        .send()
        .await
        .expect("result")
        .json()
        .await
        .expect("result body");
    assert_eq!(ack["success"], true);

    let status: Value = client
        .get(format!(
            "{}/api/training/colab/status/{session_id}",
            server.base_url
        ))
        .send()
        .await
        .expect("status")
        .json()
        .await
        .expect("status body");
    let session = &status["session"];
    assert_eq!(session["status"], "completed");
    assert!(session["completed_at"].as_str().is_some());
    assert_eq!(session["metrics"]["accuracy"], 0.9);

    server.ct.cancel();
}

#[tokio::test]
async fn launch_lists_in_session_history_newest_first() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/api/training/colab/launch", server.base_url))
            .json(&json!({}))
            .send()
            .await
            .expect("launch");
        assert_eq!(resp.status(), 200);
    }

    let body: Value = client
        .get(format!("{}/api/training/sessions", server.base_url))
        .send()
        .await
        .expect("sessions")
        .json()
        .await
        .expect("sessions body");
    let sessions = body["sessions"].as_array().expect("sessions array");
    assert_eq!(sessions.len(), 2);

    let first = sessions[0]["created_at"].as_str().expect("created_at");
    let second = sessions[1]["created_at"].as_str().expect("created_at");
    assert!(first >= second, "history must be newest first");

    server.ct.cancel();
}

#[tokio::test]
async fn launch_persists_the_session_across_store_reloads() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();

    let launch: Value = client
        .post(format!("{}/api/training/colab/launch", server.base_url))
        .json(&json!({ "dataset_id": "ds-42" }))
        .send()
        .await
        .expect("launch")
        .json()
        .await
        .expect("launch body");
    let session_id = launch["session_id"].as_str().expect("session id");

    // Read the backing document directly: the record is durable, not
    // process-local.
    let sessions = server.state.sessions.list().await.expect("list");
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, session_id);
    assert_eq!(sessions[0].dataset_id, "ds-42");

    server.ct.cancel();
}
