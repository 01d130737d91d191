//! Training-session model and lifecycle transitions.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Lifecycle status for an external training session.
///
/// The ordered checkpoints mirror the cells of the generated notebook; the
/// notebook reports them best-effort, so callbacks may arrive out of order
/// and each one is applied independently, last-write-wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session record created, notebook not yet rendered.
    Initializing,
    /// Notebook rendered and ready for the operator to download.
    Ready,
    /// Notebook execution has begun in the external environment.
    Started,
    /// Training dataset downloaded inside the notebook.
    DatasetReady,
    /// Base model weights loaded.
    ModelReady,
    /// Training loop running.
    TrainingStarted,
    /// Validation pass finished.
    ValidationCompleted,
    /// Nutrition analysis of the detected classes finished.
    NutritionAnalysisCompleted,
    /// Trained model exported to deployment formats.
    ModelsExported,
    /// Final results received; terminal.
    Completed,
    /// Stopped by the operator; terminal but advisory only.
    Stopped,
}

impl SessionStatus {
    /// Whether this status is one of the two terminal states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

/// Training hyperparameters supplied at launch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// `YOLOv8` variant to train (`yolov8n`, `yolov8s`, `yolov8m`, ...).
    #[serde(default = "default_model_type")]
    pub model_type: String,
    /// Number of training epochs.
    #[serde(default = "default_epochs")]
    pub epochs: u32,
    /// Images per training batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Initial learning rate.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Square input image size in pixels.
    #[serde(default = "default_img_size")]
    pub img_size: u32,
    /// Early-stopping patience in epochs.
    #[serde(default = "default_patience")]
    pub patience: u32,
    /// Checkpoint save period in epochs.
    #[serde(default = "default_save_period")]
    pub save_period: u32,
    /// Whether training-time augmentation is enabled.
    #[serde(default = "default_augment")]
    pub augment: bool,
    /// Optimizer name passed through to the training loop.
    #[serde(default = "default_optimizer")]
    pub optimizer: String,
    /// Loss function name passed through to the training loop.
    #[serde(default = "default_loss_function")]
    pub loss_function: String,
}

fn default_model_type() -> String {
    "yolov8n".into()
}

fn default_epochs() -> u32 {
    100
}

fn default_batch_size() -> u32 {
    16
}

fn default_learning_rate() -> f64 {
    0.01
}

fn default_img_size() -> u32 {
    640
}

fn default_patience() -> u32 {
    20
}

fn default_save_period() -> u32 {
    10
}

fn default_augment() -> bool {
    true
}

fn default_optimizer() -> String {
    "AdamW".into()
}

fn default_loss_function() -> String {
    "BCE".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_type: default_model_type(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            img_size: default_img_size(),
            patience: default_patience(),
            save_period: default_save_period(),
            augment: default_augment(),
            optimizer: default_optimizer(),
            loss_function: default_loss_function(),
        }
    }
}

impl ModelConfig {
    /// Apply the variant-specific resource caps.
    ///
    /// Larger variants exhaust Colab GPU memory at the small-variant
    /// defaults, so batch size and learning rate are clamped downward:
    /// `yolov8s` to batch 12 / lr 0.005, `yolov8m` to batch 8 / lr 0.003.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        match self.model_type.as_str() {
            "yolov8s" => {
                self.batch_size = self.batch_size.min(12);
                self.learning_rate = self.learning_rate.min(0.005);
            }
            "yolov8m" => {
                self.batch_size = self.batch_size.min(8);
                self.learning_rate = self.learning_rate.min(0.003);
            }
            _ => {}
        }
        self
    }
}

/// One entry of the append-only callback audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct SessionLogEntry {
    /// When the callback was received (or the timestamp it carried).
    pub timestamp: DateTime<Utc>,
    /// Status tag the callback reported.
    pub status: SessionStatus,
    /// Free-form payload fields beyond the status tag.
    pub data: Value,
}

/// One attempted external training run tracked by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TrainingSession {
    /// Unique record identifier; immutable primary key.
    pub id: String,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// Dataset the session trains against.
    pub dataset_id: String,
    /// Hyperparameters supplied at launch; immutable afterwards.
    pub model_config: ModelConfig,
    /// Free-form auxiliary parameters supplied at launch; immutable.
    pub training_params: Value,
    /// Configuration written by an explicit reconfigure request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_config: Option<Value>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
    /// Set once, on the final-result transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Advisory launch URL handed to the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colab_url: Option<String>,
    /// Completion percentage; UI hint only, monotonicity is not enforced.
    #[serde(default)]
    pub progress: u8,
    /// Append-only audit trail of every status callback received.
    #[serde(default)]
    pub logs: Vec<SessionLogEntry>,
    /// Dataset statistics reported by the notebook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_stats: Option<Value>,
    /// Validation metrics reported by the notebook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,
    /// Nutrition analysis results reported by the notebook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition_analysis: Option<Value>,
    /// Export format → artifact path mapping reported by the notebook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_models: Option<Value>,
    /// Full final summary document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    /// Best checkpoint path inside the external environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_model_path: Option<String>,
    /// Generated single-use notebook artifact; cleared after download.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_path: Option<PathBuf>,
}

impl TrainingSession {
    /// Construct a new session with defaults and generated identifier.
    #[must_use]
    pub fn new(dataset_id: String, model_config: ModelConfig, training_params: Value) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: SessionStatus::Initializing,
            dataset_id,
            model_config,
            training_params,
            training_config: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
            colab_url: None,
            progress: 0,
            logs: Vec::new(),
            dataset_stats: None,
            metrics: None,
            nutrition_analysis: None,
            exported_models: None,
            summary: None,
            best_model_path: None,
            notebook_path: None,
        }
    }

    /// Transition `initializing -> ready` after the notebook is rendered.
    pub fn mark_ready(&mut self, colab_url: String, notebook_path: PathBuf) {
        self.status = SessionStatus::Ready;
        self.colab_url = Some(colab_url);
        self.notebook_path = Some(notebook_path);
        self.updated_at = Utc::now();
    }

    /// Apply one status callback.
    ///
    /// Appends to the audit trail, sets the status, refreshes `updated_at`,
    /// and overwrites the known payload sub-fields (`dataset_stats`,
    /// `metrics`, `nutrition_results`, `exported_models`, `progress`).
    /// Callbacks are applied regardless of the current status: the notebook
    /// reports best-effort and deliveries can reorder, so no transition is
    /// rejected here, including after a terminal state.
    pub fn apply_status(
        &mut self,
        status: SessionStatus,
        timestamp: Option<DateTime<Utc>>,
        payload: &Map<String, Value>,
    ) {
        let at = timestamp.unwrap_or_else(Utc::now);
        self.logs.push(SessionLogEntry {
            timestamp: at,
            status,
            data: Value::Object(payload.clone()),
        });
        self.status = status;
        self.updated_at = at;

        if let Some(stats) = payload.get("dataset_stats") {
            self.dataset_stats = Some(stats.clone());
        }
        if let Some(metrics) = payload.get("metrics") {
            self.metrics = Some(metrics.clone());
        }
        if let Some(nutrition) = payload.get("nutrition_results") {
            self.nutrition_analysis = Some(nutrition.clone());
        }
        if let Some(exported) = payload.get("exported_models") {
            self.exported_models = Some(exported.clone());
        }
        if let Some(progress) = payload.get("progress").and_then(Value::as_u64) {
            self.progress = u8::try_from(progress.min(100)).unwrap_or(100);
        }
    }

    /// Apply the final-result callback.
    ///
    /// Sets the (defaulted) terminal status, stamps `completed_at`, stores
    /// the summary document, and lifts its nested result fields to the top
    /// level for the UI.
    pub fn apply_result(
        &mut self,
        status: Option<SessionStatus>,
        summary: Option<Value>,
        timestamp: Option<DateTime<Utc>>,
    ) {
        let at = timestamp.unwrap_or_else(Utc::now);
        self.status = status.unwrap_or(SessionStatus::Completed);
        self.completed_at = Some(at);
        self.updated_at = at;

        if let Some(summary) = summary {
            if let Some(info) = summary.get("dataset_info") {
                self.dataset_stats = Some(info.clone());
            }
            if let Some(results) = summary.get("model_results") {
                if let Some(metrics) = results.get("metrics") {
                    self.metrics = Some(metrics.clone());
                }
                if let Some(exported) = results.get("exported_models") {
                    self.exported_models = Some(exported.clone());
                }
                if let Some(best) = results.get("best_model_path").and_then(Value::as_str) {
                    self.best_model_path = Some(best.to_owned());
                }
            }
            if let Some(nutrition) = summary.get("nutrition_analysis") {
                self.nutrition_analysis = Some(nutrition.clone());
            }
            self.summary = Some(summary);
        }
    }

    /// Record an operator stop request.
    ///
    /// Advisory only: nothing reaches into the external environment, and
    /// later callbacks from a notebook that kept running still apply.
    pub fn apply_stop(&mut self) {
        self.status = SessionStatus::Stopped;
        self.updated_at = Utc::now();
    }

    /// Store an explicit reconfiguration without touching the status.
    pub fn apply_reconfigure(&mut self, config: Value) {
        self.training_config = Some(config);
        self.updated_at = Utc::now();
    }
}
