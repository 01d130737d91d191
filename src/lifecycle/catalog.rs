//! Built-in notebook template catalog surfaced to the UI.

use serde::Serialize;

use crate::models::session::ModelConfig;

/// One selectable training template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TemplateCatalogEntry {
    /// Stable template identifier.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Short description for the picker.
    pub description: &'static str,
    /// Parameters the template exposes for editing.
    pub parameters: &'static [&'static str],
    /// Variant the template targets.
    pub model_type: &'static str,
    /// Pre-filled configuration.
    pub default_config: ModelConfig,
}

/// The fixed set of templates offered by the dashboard.
#[must_use]
pub fn builtin_templates() -> Vec<TemplateCatalogEntry> {
    vec![
        TemplateCatalogEntry {
            id: "yolov8_basic",
            name: "YOLOv8 basic training",
            description: "Baseline YOLOv8 training for Malaysian food detection",
            parameters: &["epochs", "batch_size", "learning_rate", "img_size"],
            model_type: "yolov8n",
            default_config: ModelConfig {
                epochs: 50,
                ..ModelConfig::default()
            },
        },
        TemplateCatalogEntry {
            id: "yolov8_advanced",
            name: "YOLOv8 advanced training",
            description: "Training with augmentation and tuned optimizer settings",
            parameters: &[
                "epochs",
                "batch_size",
                "learning_rate",
                "img_size",
                "augment",
                "optimizer",
            ],
            model_type: "yolov8s",
            default_config: ModelConfig {
                model_type: "yolov8s".into(),
                epochs: 100,
                batch_size: 8,
                learning_rate: 0.005,
                ..ModelConfig::default()
            },
        },
        TemplateCatalogEntry {
            id: "custom_training",
            name: "Custom training",
            description: "Fully custom training configuration",
            parameters: &[
                "model_type",
                "epochs",
                "batch_size",
                "learning_rate",
                "img_size",
                "augment",
                "optimizer",
                "loss_function",
            ],
            model_type: "yolov8m",
            default_config: ModelConfig {
                model_type: "yolov8m".into(),
                epochs: 150,
                batch_size: 12,
                learning_rate: 0.003,
                ..ModelConfig::default()
            },
        },
    ]
}
