//! Model registry and version history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Activation state of a model version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Version currently served.
    Active,
    /// Version retained in history only.
    Inactive,
}

/// One immutable version of a registered model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ModelVersion {
    /// Unique version identifier.
    pub id: String,
    /// Owning model identifier.
    pub model_id: String,
    /// Human-readable version label (`v1`, `v2`, ...).
    pub version_name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Arbitrary performance figures captured at registration time.
    #[serde(default)]
    pub performance_data: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Activation state.
    pub status: VersionStatus,
    /// Set when this version was re-activated by a rollback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback_at: Option<DateTime<Utc>>,
}

/// A registered model and its version history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ModelRecord {
    /// Unique record identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Version history keyed by version id.
    #[serde(default)]
    pub versions: BTreeMap<String, ModelVersion>,
}

impl ModelRecord {
    /// Register a new version, auto-numbering its label when absent.
    ///
    /// The new version starts `active`; previously active versions keep
    /// their state (rollback is the explicit way to switch).
    pub fn add_version(
        &mut self,
        version_name: Option<String>,
        description: String,
        performance_data: Value,
    ) -> ModelVersion {
        let now = Utc::now();
        let version = ModelVersion {
            id: Uuid::new_v4().to_string(),
            model_id: self.id.clone(),
            version_name: version_name.unwrap_or_else(|| format!("v{}", self.versions.len() + 1)),
            description,
            performance_data,
            created_at: now,
            status: VersionStatus::Active,
            rollback_at: None,
        };
        self.versions.insert(version.id.clone(), version.clone());
        self.updated_at = now;
        version
    }

    /// Re-activate `version_id`, deactivating every other version.
    ///
    /// Returns the re-activated version, or `None` when the id is unknown.
    pub fn rollback(&mut self, version_id: &str) -> Option<ModelVersion> {
        if !self.versions.contains_key(version_id) {
            return None;
        }
        let now = Utc::now();
        for version in self.versions.values_mut() {
            version.status = VersionStatus::Inactive;
        }
        let target = self.versions.get_mut(version_id)?;
        target.status = VersionStatus::Active;
        target.rollback_at = Some(now);
        self.updated_at = now;
        Some(target.clone())
    }
}
