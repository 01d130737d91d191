//! Unknown-session handling: every operation returns a structured 404
//! and leaves the store unmodified.

use serde_json::{json, Value};

use super::test_helpers::spawn_server;

#[tokio::test]
async fn all_session_operations_return_not_found() {
    let server = spawn_server().await;
    let client = reqwest::Client::new();
    let base = &server.base_url;
    let bogus = "00000000-0000-0000-0000-000000000000";

    let get_status = client
        .get(format!("{base}/api/training/colab/status/{bogus}"))
        .send()
        .await
        .expect("get status");
    assert_eq!(get_status.status(), 404);
    let body: Value = get_status.json().await.expect("json");
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "not_found");

    let post_status = client
        .post(format!("{base}/api/training/colab/status/{bogus}"))
        .json(&json!({ "status": "started" }))
        .send()
        .await
        .expect("post status");
    assert_eq!(post_status.status(), 404);

    let post_result = client
        .post(format!("{base}/api/training/colab/result"))
        .json(&json!({ "session_id": bogus, "summary": {} }))
        .send()
        .await
        .expect("post result");
    assert_eq!(post_result.status(), 404);

    let stop = client
        .post(format!("{base}/api/training/colab/stop/{bogus}"))
        .send()
        .await
        .expect("stop");
    assert_eq!(stop.status(), 404);

    let reconfigure = client
        .post(format!("{base}/api/training/colab/config"))
        .json(&json!({ "session_id": bogus, "config": {} }))
        .send()
        .await
        .expect("reconfigure");
    assert_eq!(reconfigure.status(), 404);

    let download = client
        .get(format!("{base}/api/training/colab/template/{bogus}/download"))
        .send()
        .await
        .expect("download");
    assert_eq!(download.status(), 404);

    // None of the failed operations may have created or mutated records.
    let sessions = server.state.sessions.list().await.expect("list");
    assert!(sessions.is_empty(), "store must stay unmodified");

    server.ct.cancel();
}
