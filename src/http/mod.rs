//! HTTP dispatcher: routing, shared state, and the server loop.
//!
//! Translates inbound requests into lifecycle-manager and client calls;
//! holds no domain state of its own.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::clients::{GeminiClient, RoboflowClient};
use crate::config::GlobalConfig;
use crate::lifecycle::SessionManager;
use crate::models::dataset::DatasetRecord;
use crate::models::model_version::ModelRecord;
use crate::models::stats::SystemStats;
use crate::store::JsonStore;
use crate::{AppError, Result};

pub mod credentials;
pub mod datasets;
pub mod error;
pub mod models;
pub mod monitor;
pub mod nutrition;
pub mod training;

/// Store key under which the single aggregate-stats record lives.
pub const STATS_KEY: &str = "system";

/// Shared application state injected into every handler.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Training-session lifecycle manager.
    pub sessions: SessionManager,
    /// Dataset registry store.
    pub datasets: Arc<JsonStore<DatasetRecord>>,
    /// Model registry store.
    pub models: Arc<JsonStore<ModelRecord>>,
    /// Aggregate counters store.
    pub stats: Arc<JsonStore<SystemStats>>,
    /// Gemini nutrition-analysis client.
    pub gemini: Arc<GeminiClient>,
    /// Roboflow dataset/model client.
    pub roboflow: Arc<RoboflowClient>,
}

/// Handler for `GET /health`: plain-text liveness probe.
async fn health() -> &'static str {
    "ok"
}

/// Handler for `GET /`: service banner for operators hitting the root.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "service": "nutriscan-dashboard",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Fallback: structured not-found for `/api`, redirect everything else.
async fn fallback(request: Request) -> Response {
    if request.uri().path().starts_with("/api") {
        let body = json!({
            "success": false,
            "error": "API endpoint not found",
            "code": "not_found",
            "available_endpoints": [
                "/api/monitor/health",
                "/api/monitor/stats",
                "/api/training/colab/templates",
                "/api/datasets",
                "/api/models/versions",
            ],
        });
        (axum::http::StatusCode::NOT_FOUND, Json(body)).into_response()
    } else {
        Redirect::to("/").into_response()
    }
}

/// Middleware counting every `/api` call into the persisted stats record.
///
/// A store failure here is logged and swallowed: bookkeeping must never
/// fail the request being counted.
async fn track_api_calls(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let outcome = state
        .stats
        .update(|records| {
            records.entry(STATS_KEY.to_owned()).or_default().api_calls += 1;
            Ok(())
        })
        .await;
    if let Err(err) = outcome {
        warn!(%err, "failed to record api call");
    }
    next.run(request).await
}

/// Assemble the full application router.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Colab training sessions.
        .route("/training/colab/launch", post(training::launch))
        .route(
            "/training/colab/status/{session_id}",
            post(training::record_status).get(training::get_status),
        )
        .route("/training/colab/result", post(training::record_result))
        .route(
            "/training/colab/template/{session_id}/download",
            get(training::download_notebook),
        )
        .route("/training/colab/config", post(training::reconfigure))
        .route("/training/colab/stop/{session_id}", post(training::stop))
        .route("/training/colab/templates", get(training::list_templates))
        .route("/training/sessions", get(training::list_sessions))
        // Dataset registry.
        .route("/datasets", get(datasets::list))
        .route("/datasets/upload", post(datasets::upload))
        .route("/datasets/sync", post(datasets::sync))
        .route("/datasets/analyze/{dataset_id}", get(datasets::analyze))
        // Model registry.
        .route("/models", post(models::register))
        .route("/models/versions", get(models::list_versions))
        .route("/models/version", post(models::create_version))
        .route("/models/{model_id}/versions", get(models::version_history))
        .route("/models/{model_id}/rollback", post(models::rollback))
        .route("/models/compare", get(models::compare))
        // Nutrition analysis.
        .route("/nutrition/analyze", post(nutrition::analyze))
        .route("/nutrition/analyze-batch", post(nutrition::analyze_batch))
        .route("/nutrition/test", get(nutrition::test))
        .route("/nutrition/clear-cache", post(nutrition::clear_cache))
        // Monitoring.
        .route("/monitor/health", get(monitor::health))
        .route("/monitor/stats", get(monitor::stats))
        .route("/monitor/logs", get(monitor::logs))
        .route("/monitor/clear-cache", post(monitor::clear_cache))
        // Credential status.
        .route("/config/status", get(credentials::status))
        .route("/config/test", post(credentials::test))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            track_api_calls,
        ))
        .with_state(Arc::clone(&state));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api", api)
        .fallback(fallback)
}

/// Start the HTTP server on `config.http_port`.
///
/// Serves until `ct` is cancelled, then shuts down gracefully.
///
/// # Errors
///
/// Returns `AppError::Config` if the server fails to bind.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let port = state.config.http_port;
    let bind = SocketAddr::from(([0, 0, 0, 0], port));

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind HTTP on {bind}: {err}")))?;

    info!(%bind, "starting dashboard HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
        })
        .await
        .map_err(|err| AppError::Config(format!("HTTP server error: {err}")))?;

    info!("dashboard HTTP server shut down");
    Ok(())
}
