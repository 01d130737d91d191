//! Model registry and version-history routes.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::models::model_version::{ModelRecord, ModelVersion};
use crate::AppError;

use super::error::ApiResult;
use super::AppState;

/// Body of `POST /api/models`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegisterRequest {
    /// Model display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
}

/// Register a new model in the local registry.
///
/// # Errors
///
/// Returns `AppError::Store` when persistence fails.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<Value>> {
    let now = Utc::now();
    let record = ModelRecord {
        id: Uuid::new_v4().to_string(),
        name: request.name,
        description: request.description,
        created_at: now,
        updated_at: now,
        versions: std::collections::BTreeMap::new(),
    };
    let id = record.id.clone();
    state
        .models
        .update(move |records| {
            records.insert(record.id.clone(), record);
            Ok(())
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "model_id": id,
        "message": "model registered",
    })))
}

/// List known model versions, preferring live Roboflow data.
///
/// # Errors
///
/// Returns `AppError::Store` when the local registry cannot be read.
pub async fn list_versions(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    if state.roboflow.is_configured() {
        match state.roboflow.versions().await {
            Ok(versions) => {
                return Ok(Json(json!({ "success": true, "models": versions })));
            }
            Err(err) => {
                warn!(%err, "roboflow version query failed, serving local registry");
            }
        }
    }

    let models: Vec<ModelRecord> = state.models.load().await?.into_values().collect();
    Ok(Json(json!({ "success": true, "models": models })))
}

/// Body of `POST /api/models/version`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreateVersionRequest {
    /// Owning model identifier.
    pub model_id: String,
    /// Version label; auto-numbered when absent.
    pub version_name: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Arbitrary performance figures.
    #[serde(default)]
    pub performance_data: Value,
}

/// Register a new version of an existing model.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown model id.
pub async fn create_version(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateVersionRequest>,
) -> ApiResult<Json<Value>> {
    let model_id = request.model_id.clone();
    let version = state
        .models
        .update(move |records| {
            let model = records
                .get_mut(&request.model_id)
                .ok_or_else(|| AppError::NotFound(format!("model {} not found", request.model_id)))?;
            Ok(model.add_version(
                request.version_name,
                request.description,
                request.performance_data,
            ))
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "model_id": model_id,
        "version": version,
        "message": "model version created",
    })))
}

/// List one model's version history, newest first.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown model id.
pub async fn version_history(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let model = state
        .models
        .load()
        .await?
        .remove(&model_id)
        .ok_or_else(|| AppError::NotFound(format!("model {model_id} not found")))?;

    let mut versions: Vec<ModelVersion> = model.versions.into_values().collect();
    versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(json!({ "success": true, "versions": versions })))
}

/// Body of `POST /api/models/{model_id}/rollback`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RollbackRequest {
    /// Version to re-activate.
    pub version_id: String,
}

/// Re-activate an earlier version of a model.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown model or version id.
pub async fn rollback(
    State(state): State<Arc<AppState>>,
    Path(model_id): Path<String>,
    Json(request): Json<RollbackRequest>,
) -> ApiResult<Json<Value>> {
    let version = state
        .models
        .update(move |records| {
            let model = records
                .get_mut(&model_id)
                .ok_or_else(|| AppError::NotFound(format!("model {model_id} not found")))?;
            model.rollback(&request.version_id).ok_or_else(|| {
                AppError::NotFound(format!("version {} not found", request.version_id))
            })
        })
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "model rolled back",
        "active_version": version,
    })))
}

/// Query of `GET /api/models/compare`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompareQuery {
    /// Comma-separated model ids; all models when absent.
    pub model_ids: Option<String>,
}

/// Compare registered models on their latest performance figures.
///
/// # Errors
///
/// Returns `AppError::Store` when the registry cannot be read.
pub async fn compare(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CompareQuery>,
) -> ApiResult<Json<Value>> {
    let records = state.models.load().await?;

    let selected: Vec<&ModelRecord> = match query.model_ids.as_deref() {
        Some(ids) => {
            let wanted: Vec<&str> = ids.split(',').map(str::trim).collect();
            records
                .values()
                .filter(|m| wanted.contains(&m.id.as_str()))
                .collect()
        }
        None => records.values().collect(),
    };

    let rows: Vec<Map<String, Value>> = selected.iter().map(|m| comparison_row(m)).collect();

    let best_accuracy = fold_metric(&rows, "accuracy", f64::max);
    let fastest_inference = fold_metric(&rows, "inference_time", f64::min);
    let smallest_size = fold_metric(&rows, "model_size", f64::min);

    Ok(Json(json!({
        "success": true,
        "comparison": {
            "models": rows,
            "metrics": ["accuracy", "inference_time", "model_size"],
            "summary": {
                "best_accuracy": best_accuracy,
                "fastest_inference": fastest_inference,
                "smallest_size": smallest_size,
            },
        },
    })))
}

/// One comparison row, taking figures from the latest version's
/// `performance_data` with the dashboard's historical defaults.
fn comparison_row(model: &ModelRecord) -> Map<String, Value> {
    let latest = model
        .versions
        .values()
        .max_by_key(|v| v.created_at)
        .map(|v| &v.performance_data);

    let metric = |key: &str, fallback: f64| -> Value {
        latest
            .and_then(|data| data.get(key))
            .cloned()
            .unwrap_or_else(|| json!(fallback))
    };

    let mut row = Map::new();
    row.insert("id".into(), json!(model.id));
    row.insert("name".into(), json!(model.name));
    row.insert("versions".into(), json!(model.versions.len()));
    row.insert("accuracy".into(), metric("accuracy", 0.85));
    row.insert("inference_time".into(), metric("inference_time", 15.0));
    row.insert("model_size".into(), metric("model_size", 6.2));
    row.insert("created_at".into(), json!(model.created_at));
    row
}

fn fold_metric(
    rows: &[Map<String, Value>],
    key: &str,
    pick: fn(f64, f64) -> f64,
) -> Option<f64> {
    rows.iter()
        .filter_map(|row| row.get(key).and_then(Value::as_f64))
        .reduce(pick)
}
