//! Notebook artifact download and single-use cleanup.

use serde_json::{json, Value};

use super::test_helpers::spawn_server;

#[tokio::test]
async fn download_streams_the_notebook_with_attachment_headers() {
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

    let resp = client
        .get(format!(
            "{}/api/training/colab/template/{session_id}/download",
            server.base_url
        ))
        .send()
        .await
        .expect("download");
    assert_eq!(resp.status(), 200);

    let disposition = resp
        .headers()
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .expect("content-disposition header")
        .to_owned();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains(&format!("nutriscan_training_{session_id}.ipynb")));

    let raw = resp.text().await.expect("notebook body");
    let document: Value = serde_json::from_str(&raw).expect("parseable notebook");
    assert_eq!(document["nbformat"], 4);

    server.ct.cancel();
}

#[tokio::test]
async fn notebook_is_single_use() {
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
    let url = format!(
        "{}/api/training/colab/template/{session_id}/download",
        server.base_url
    );

    let first = client.get(&url).send().await.expect("first download");
    assert_eq!(first.status(), 200);

    let second = client.get(&url).send().await.expect("second download");
    assert_eq!(second.status(), 404);
    let body: Value = second.json().await.expect("json");
    assert_eq!(body["code"], "artifact_missing");

    // The session record itself is untouched by artifact cleanup.
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

    server.ct.cancel();
}
