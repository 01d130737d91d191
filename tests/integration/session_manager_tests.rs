//! Lifecycle-manager tests against real stores, below the HTTP layer.

use serde_json::{json, Map, Value};

use nutriscan_dashboard::models::session::{ModelConfig, SessionStatus};
use nutriscan_dashboard::AppError;

use super::test_helpers::{test_config, test_state};

#[tokio::test]
async fn launch_writes_the_notebook_artifact() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = test_state(test_config(temp.path().to_str().expect("utf8")));

    let session = state
        .sessions
        .launch(Some("ds-1".into()), Some(ModelConfig::default()), None)
        .await
        .expect("launch");

    assert_eq!(session.status, SessionStatus::Ready);
    let path = session.notebook_path.as_ref().expect("notebook path");
    assert!(path.exists(), "artifact must exist after launch");

    let raw = std::fs::read_to_string(path).expect("read artifact");
    let document: Value = serde_json::from_str(&raw).expect("parseable artifact");
    assert_eq!(document["nbformat"], 4);
}

#[tokio::test]
async fn take_notebook_is_single_use() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = test_state(test_config(temp.path().to_str().expect("utf8")));

    let session = state
        .sessions
        .launch(None, None, None)
        .await
        .expect("launch");

    let (filename, bytes) = state
        .sessions
        .take_notebook(&session.id)
        .await
        .expect("first take");
    assert_eq!(filename, format!("nutriscan_training_{}.ipynb", session.id));
    assert!(!bytes.is_empty());

    let err = state
        .sessions
        .take_notebook(&session.id)
        .await
        .expect_err("second take must fail");
    assert!(matches!(err, AppError::ArtifactMissing(_)));
}

#[tokio::test]
async fn unknown_session_operations_return_not_found() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = test_state(test_config(temp.path().to_str().expect("utf8")));

    let err = state
        .sessions
        .record_status("ghost", SessionStatus::Started, None, Map::new())
        .await
        .expect_err("status must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    let err = state
        .sessions
        .record_result("ghost", None, None, None)
        .await
        .expect_err("result must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    let err = state.sessions.stop("ghost").await.expect_err("stop must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    let err = state
        .sessions
        .reconfigure("ghost", json!({}))
        .await
        .expect_err("reconfigure must fail");
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(state.sessions.list().await.expect("list").is_empty());
}

#[tokio::test]
async fn result_after_stop_still_completes_the_session() {
    let temp = tempfile::tempdir().expect("tempdir");
    let state = test_state(test_config(temp.path().to_str().expect("utf8")));

    let session = state
        .sessions
        .launch(None, None, None)
        .await
        .expect("launch");
    state.sessions.stop(&session.id).await.expect("stop");

    let finished = state
        .sessions
        .record_result(
            &session.id,
            None,
            Some(json!({ "model_results": { "metrics": { "accuracy": 0.8 } } })),
            None,
        )
        .await
        .expect("result");
    assert_eq!(finished.status, SessionStatus::Completed);
    assert_eq!(finished.metrics, Some(json!({ "accuracy": 0.8 })));
    assert!(finished.completed_at.is_some());
}

#[tokio::test]
async fn sessions_survive_a_manager_rebuild() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().to_str().expect("utf8");

    let session_id = {
        let state = test_state(test_config(dir));
        state
            .sessions
            .launch(None, None, None)
            .await
            .expect("launch")
            .id
    };

    // A fresh state over the same data dir sees the same records.
    let state = test_state(test_config(dir));
    let reloaded = state.sessions.get(&session_id).await.expect("reload");
    assert_eq!(reloaded.status, SessionStatus::Ready);
}
