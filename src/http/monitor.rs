//! System monitoring routes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::{AppState, STATS_KEY};

/// Health check with a timestamped payload.
pub async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "healthy",
        "timestamp": Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Aggregate counters plus process uptime.
///
/// # Errors
///
/// Returns `AppError::Store` when the stats store cannot be read.
pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let stats = state
        .stats
        .load()
        .await?
        .remove(STATS_KEY)
        .unwrap_or_default();

    Ok(Json(json!({
        "success": true,
        "stats": {
            "api_calls": stats.api_calls,
            "errors": stats.errors,
            "uptime": stats.uptime_seconds(),
        },
    })))
}

fn default_log_limit() -> usize {
    100
}

/// Query of `GET /api/monitor/logs`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogsQuery {
    /// Maximum number of entries.
    #[serde(default = "default_log_limit")]
    pub limit: usize,
}

/// Recent callback activity across all sessions, newest first.
///
/// The session audit trails are the system's only event log; this view
/// flattens and orders them for the operator.
///
/// # Errors
///
/// Returns `AppError::Store` when the session store cannot be read.
pub async fn logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Value>> {
    let sessions = state.sessions.list().await?;

    let mut entries: Vec<Value> = sessions
        .iter()
        .flat_map(|session| {
            session.logs.iter().map(|entry| {
                json!({
                    "session_id": session.id,
                    "timestamp": entry.timestamp,
                    "status": entry.status,
                    "source": "colab_callback",
                })
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        let ts = |v: &Value| v.get("timestamp").and_then(Value::as_str).map(str::to_owned);
        ts(b).cmp(&ts(a))
    });
    entries.truncate(query.limit);

    Ok(Json(json!({ "success": true, "logs": entries })))
}

/// Drop process-local caches (currently the nutrition cache).
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.gemini.clear_cache().await;
    Json(json!({ "success": true, "message": "cache cleared" }))
}
