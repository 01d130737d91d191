//! Nutrition analysis routes.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiResult;
use super::AppState;

fn default_language() -> String {
    "zh-CN".into()
}

/// Body of `POST /api/nutrition/analyze`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyzeRequest {
    /// Food to analyze.
    pub food_name: String,
    /// Response language.
    #[serde(default = "default_language")]
    pub language: String,
}

/// Analyze one food item.
///
/// Never fails on an unreachable Gemini API: the client degrades to its
/// fallback table.
///
/// # Errors
///
/// Infallible in practice; the signature matches the other handlers.
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> ApiResult<Json<Value>> {
    let info = state
        .gemini
        .analyze(&request.food_name, &request.language)
        .await;
    Ok(Json(json!({ "success": true, "nutrition_info": info })))
}

/// Body of `POST /api/nutrition/analyze-batch`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalyzeBatchRequest {
    /// Foods to analyze.
    pub food_names: Vec<String>,
    /// Response language.
    #[serde(default = "default_language")]
    pub language: String,
}

/// Analyze a batch of food items.
///
/// # Errors
///
/// Infallible in practice; the signature matches the other handlers.
pub async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeBatchRequest>,
) -> ApiResult<Json<Value>> {
    let results = state
        .gemini
        .analyze_batch(&request.food_names, &request.language)
        .await;
    Ok(Json(json!({
        "success": true,
        "nutrition_results": results,
        "total_analyzed": request.food_names.len(),
    })))
}

/// Probe the Gemini API and report cache statistics.
///
/// A probe failure is reported inside the payload, not as an HTTP error.
pub async fn test(State(state): State<Arc<AppState>>) -> Json<Value> {
    let test_result = match state.gemini.test_connection().await {
        Ok(result) => result,
        Err(err) => json!({ "success": false, "error": err.to_string() }),
    };
    Json(json!({
        "success": true,
        "test_result": test_result,
        "cache_stats": state.gemini.cache_stats().await,
    }))
}

/// Drop every cached nutrition analysis.
pub async fn clear_cache(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.gemini.clear_cache().await;
    Json(json!({ "success": true, "message": "nutrition cache cleared" }))
}
