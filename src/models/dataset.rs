//! Dataset registry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ingestion status for a registered dataset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    /// Upload announced but content not yet ingested.
    Uploading,
    /// Dataset available for training.
    Ready,
}

/// A dataset tracked by the dashboard.
///
/// Records registered here are local bookkeeping; the authoritative image
/// data lives in Roboflow and is pulled by the notebook at training time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DatasetRecord {
    /// Unique record identifier.
    pub id: String,
    /// Human-readable dataset name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Where the dataset originated (upload, roboflow sync, ...).
    #[serde(default)]
    pub source: String,
    /// Current ingestion status.
    pub status: DatasetStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Number of files in the dataset.
    #[serde(default)]
    pub file_count: u64,
    /// Total size in bytes.
    #[serde(default)]
    pub total_size: u64,
}

impl DatasetRecord {
    /// Construct a freshly announced dataset upload.
    #[must_use]
    pub fn new(name: String, description: String, source: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            source,
            status: DatasetStatus::Uploading,
            created_at: now,
            updated_at: now,
            file_count: 0,
            total_size: 0,
        }
    }
}
