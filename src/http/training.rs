//! Colab training-session routes.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::lifecycle::catalog::builtin_templates;
use crate::models::session::{ModelConfig, SessionStatus};

use super::error::ApiResult;
use super::AppState;

/// Body of `POST /api/training/colab/launch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LaunchRequest {
    /// Dataset to train against; defaulted when absent.
    pub dataset_id: Option<String>,
    /// Hyperparameters; missing fields take documented defaults.
    pub model_config: Option<ModelConfig>,
    /// Free-form auxiliary parameters.
    pub training_params: Option<Value>,
}

/// Launch a new training session and render its notebook.
///
/// # Errors
///
/// Returns `AppError::Template` or `AppError::Io` when the notebook cannot
/// be produced, or `AppError::Store` when persistence fails.
pub async fn launch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LaunchRequest>,
) -> ApiResult<Json<Value>> {
    let session = state
        .sessions
        .launch(
            request.dataset_id,
            request.model_config,
            request.training_params,
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "session_id": session.id,
        "colab_url": session.colab_url,
        "template_download_url":
            format!("/api/training/colab/template/{}/download", session.id),
        "message": "Colab training session created",
    })))
}

/// Body of `POST /api/training/colab/status/{session_id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusCallback {
    /// Reported lifecycle tag.
    pub status: SessionStatus,
    /// Timestamp the notebook attached, when present.
    pub timestamp: Option<DateTime<Utc>>,
    /// Everything else in the callback body.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Ingest one status callback from the external environment.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown session id.
pub async fn record_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(callback): Json<StatusCallback>,
) -> ApiResult<Json<Value>> {
    state
        .sessions
        .record_status(
            &session_id,
            callback.status,
            callback.timestamp,
            callback.extra,
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "status updated" })))
}

/// Fetch the full state of one session.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown session id.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let session = state.sessions.get(&session_id).await?;
    Ok(Json(json!({ "success": true, "session": session })))
}

/// Body of `POST /api/training/colab/result`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResultCallback {
    /// Session the result belongs to.
    pub session_id: String,
    /// Terminal status; defaults to `completed`.
    pub status: Option<SessionStatus>,
    /// Full summary document produced by the notebook.
    pub summary: Option<Value>,
    /// Timestamp the notebook attached, when present.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Ingest the final-result callback.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown session id.
pub async fn record_result(
    State(state): State<Arc<AppState>>,
    Json(callback): Json<ResultCallback>,
) -> ApiResult<Json<Value>> {
    state
        .sessions
        .record_result(
            &callback.session_id,
            callback.status,
            callback.summary,
            callback.timestamp,
        )
        .await?;

    Ok(Json(json!({ "success": true, "message": "training result saved" })))
}

/// Stream the generated notebook back to the operator.
///
/// The artifact is single-use; a short-delay cleanup is scheduled once the
/// bytes have been read.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown session id, or
/// `AppError::ArtifactMissing` when the notebook was already consumed.
pub async fn download_notebook(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Response> {
    let (filename, bytes) = state.sessions.take_notebook(&session_id).await?;
    let headers = [
        (header::CONTENT_TYPE, "application/x-ipynb+json".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// Body of `POST /api/training/colab/config`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReconfigureRequest {
    /// Session to reconfigure.
    pub session_id: String,
    /// Replacement training configuration.
    pub config: Value,
}

/// Store an explicit reconfiguration for a session.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown session id.
pub async fn reconfigure(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ReconfigureRequest>,
) -> ApiResult<Json<Value>> {
    state
        .sessions
        .reconfigure(&request.session_id, request.config)
        .await?;
    Ok(Json(json!({ "success": true, "message": "training config updated" })))
}

/// Record an operator stop request.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown session id.
pub async fn stop(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.sessions.stop(&session_id).await?;
    Ok(Json(json!({ "success": true, "message": "training stopped" })))
}

/// List the built-in template catalog.
pub async fn list_templates() -> Json<Value> {
    Json(json!({ "success": true, "templates": builtin_templates() }))
}

/// List every session, newest first.
///
/// # Errors
///
/// Returns `AppError::Store` when the session store cannot be read.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let mut sessions = state.sessions.list().await?;
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(json!({ "success": true, "sessions": sessions })))
}
