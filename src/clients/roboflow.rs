//! Roboflow client for dataset and model-version queries.

use std::time::Duration;

use serde_json::{json, Value};

use crate::config::RoboflowConfig;
use crate::{AppError, Result};

/// Thin wrapper over the Roboflow REST API.
pub struct RoboflowClient {
    http: reqwest::Client,
    config: RoboflowConfig,
}

impl RoboflowClient {
    /// Build a client with the given connectivity settings and timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::External` if the HTTP client cannot be built.
    pub fn new(config: RoboflowConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, config })
    }

    /// Whether a workspace API key is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    /// Fetch the configured project's metadata, including its versions.
    ///
    /// # Errors
    ///
    /// Returns `AppError::External` when the credential is missing, the
    /// call times out, or Roboflow answers with an error status.
    pub async fn project(&self) -> Result<Value> {
        self.get(&format!(
            "{}/{}/{}",
            self.config.base_url, self.config.workspace, self.config.project_id
        ))
        .await
    }

    /// List trained model versions for the configured project.
    ///
    /// Versions are embedded in the project document; callers get the raw
    /// array (possibly empty).
    ///
    /// # Errors
    ///
    /// Returns `AppError::External` on any API failure.
    pub async fn versions(&self) -> Result<Vec<Value>> {
        let project = self.project().await?;
        Ok(project
            .pointer("/project/versions")
            .or_else(|| project.get("versions"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Probe the API root.
    ///
    /// # Errors
    ///
    /// Returns `AppError::External` when the credential is missing or the
    /// call fails.
    pub async fn test_connection(&self) -> Result<Value> {
        let root = self.get(&self.config.base_url).await?;
        Ok(json!({ "success": true, "data": root }))
    }

    async fn get(&self, url: &str) -> Result<Value> {
        if !self.is_configured() {
            return Err(AppError::External("roboflow api key not configured".into()));
        }
        let response = self
            .http
            .get(url)
            .query(&[("api_key", self.config.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response)
    }
}
