//! Third-party credential status routes.
//!
//! Credentials themselves are loaded from the OS keychain or environment
//! at startup; these routes only report whether each integration works.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::AppError;

use super::error::ApiResult;
use super::AppState;

/// Probe every configured integration.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let roboflow = probe(state.roboflow.test_connection().await);
    let gemini = probe(state.gemini.test_connection().await);

    Json(json!({
        "success": true,
        "config_status": {
            "roboflow": roboflow,
            "gemini": gemini,
        },
    }))
}

/// Body of `POST /api/config/test`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestRequest {
    /// Integration to probe (`roboflow` or `gemini`).
    pub service: String,
}

/// Probe a single integration.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown service name.
pub async fn test(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TestRequest>,
) -> ApiResult<Json<Value>> {
    let result = match request.service.as_str() {
        "roboflow" => probe(state.roboflow.test_connection().await),
        "gemini" => probe(state.gemini.test_connection().await),
        other => {
            return Err(AppError::NotFound(format!("unknown service {other}")).into());
        }
    };
    Ok(Json(result))
}

/// Collapse a probe outcome into the `{success, ...}` payload shape.
fn probe(outcome: crate::Result<Value>) -> Value {
    match outcome {
        Ok(value) => value,
        Err(err) => json!({ "success": false, "error": err.to_string() }),
    }
}
