//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keyring service name under which API credentials are stored.
const KEYRING_SERVICE: &str = "nutriscan-dashboard";

/// Nested Roboflow configuration for dataset and model-version queries.
///
/// The API key is loaded at runtime via OS keychain or environment
/// variables, not from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RoboflowConfig {
    /// Roboflow workspace slug.
    pub workspace: String,
    /// Roboflow project identifier inside the workspace.
    pub project_id: String,
    /// API base URL.
    #[serde(default = "default_roboflow_base_url")]
    pub base_url: String,
    /// Workspace API key (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

fn default_roboflow_base_url() -> String {
    "https://api.roboflow.com".into()
}

/// Nested Gemini configuration for nutrition analysis.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GeminiConfig {
    /// Generative model identifier.
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// API base URL.
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Hours before a cached nutrition analysis expires.
    #[serde(default = "default_nutrition_cache_hours")]
    pub cache_hours: u64,
    /// API key (populated at runtime).
    #[serde(skip)]
    pub api_key: String,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".into()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_nutrition_cache_hours() -> u64 {
    24
}

/// Configurable timeout values (seconds) for outbound calls and cleanup.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimeoutConfig {
    /// Outbound third-party API call timeout.
    #[serde(default = "default_external_seconds")]
    pub external_seconds: u64,
    /// Delay before a downloaded notebook artifact is deleted.
    #[serde(default = "default_artifact_cleanup_seconds")]
    pub artifact_cleanup_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            external_seconds: default_external_seconds(),
            artifact_cleanup_seconds: default_artifact_cleanup_seconds(),
        }
    }
}

fn default_external_seconds() -> u64 {
    30
}

fn default_artifact_cleanup_seconds() -> u64 {
    5
}

fn default_http_port() -> u16 {
    5000
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Directory holding the JSON entity collections and notebook artifacts.
    pub data_dir: PathBuf,
    /// HTTP port the dashboard API binds to.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Externally reachable base URL embedded into rendered notebooks.
    ///
    /// Defaults to `http://localhost:{http_port}` when absent.
    #[serde(default)]
    pub dashboard_url: Option<String>,
    /// Compatibility mode: return an empty collection instead of failing
    /// when a backing JSON document is corrupt.
    #[serde(default)]
    pub permissive_load: bool,
    /// Roboflow connectivity settings.
    pub roboflow: RoboflowConfig,
    /// Gemini connectivity settings.
    pub gemini: GeminiConfig,
    /// Timeout configuration for outbound calls and artifact cleanup.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and normalize paths.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load API credentials from OS keychain with env-var fallback.
    ///
    /// Tries the `nutriscan-dashboard` keyring service first, then falls
    /// back to `GEMINI_API_KEY` / `ROBOFLOW_API_KEY` environment variables.
    /// A missing credential is non-fatal: the affected client degrades to
    /// its fallback behavior.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a keychain lookup task panics.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.gemini.api_key = load_credential("gemini_api_key", "GEMINI_API_KEY").await?;
        self.roboflow.api_key = load_credential("roboflow_api_key", "ROBOFLOW_API_KEY").await?;
        Ok(())
    }

    /// Base URL rendered notebooks use to call back into the dashboard.
    #[must_use]
    pub fn dashboard_url(&self) -> String {
        self.dashboard_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.http_port))
    }

    /// Directory for generated single-use notebook artifacts.
    #[must_use]
    pub fn notebook_dir(&self) -> PathBuf {
        self.data_dir.join("notebooks")
    }

    fn validate(&mut self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("data_dir must not be empty".into()));
        }

        fs::create_dir_all(&self.data_dir)
            .map_err(|err| AppError::Config(format!("cannot create data_dir: {err}")))?;
        let canonical = self
            .data_dir
            .canonicalize()
            .map_err(|err| AppError::Config(format!("data_dir invalid: {err}")))?;
        self.data_dir = canonical;

        if let Some(ref url) = self.dashboard_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(
                    "dashboard_url must start with http:// or https://".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
///
/// Returns an empty string when neither source provides a value.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // Keyring is synchronous I/O, so look it up off the async threads.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) => Ok(value),
        Err(_) => {
            warn!(
                key = keyring_key,
                env = env_key,
                "credential not found; dependent client will use fallback behavior"
            );
            Ok(String::new())
        }
    }
}
