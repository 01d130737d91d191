//! Session lifecycle management: launch, callbacks, stop, reconfigure.
//!
//! All mutations go through the injected session store's serialized
//! `update` transaction, so concurrent callbacks for the same session
//! cannot overwrite each other's log entries.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::GlobalConfig;
use crate::models::session::{ModelConfig, SessionStatus, TrainingSession};
use crate::notebook::{render_document, NotebookSpec};
use crate::store::JsonStore;
use crate::{AppError, Result};

/// Orchestrates training sessions against the injected session store.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<JsonStore<TrainingSession>>,
    config: Arc<GlobalConfig>,
}

impl SessionManager {
    /// Create a manager over the given store and configuration.
    #[must_use]
    pub fn new(sessions: Arc<JsonStore<TrainingSession>>, config: Arc<GlobalConfig>) -> Self {
        Self { sessions, config }
    }

    /// Launch a new training session.
    ///
    /// Renders the notebook before anything is persisted: a render failure
    /// leaves neither a session record nor a partial artifact. On success
    /// the session is stored already transitioned `initializing -> ready`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Template` when rendering fails, `AppError::Io`
    /// when the artifact cannot be written, or `AppError::Store` when
    /// persistence fails.
    pub async fn launch(
        &self,
        dataset_id: Option<String>,
        model_config: Option<ModelConfig>,
        training_params: Option<Value>,
    ) -> Result<TrainingSession> {
        let mut session = TrainingSession::new(
            dataset_id.unwrap_or_else(|| "default_dataset".into()),
            model_config.unwrap_or_default(),
            training_params.unwrap_or_else(|| Value::Object(Map::new())),
        );

        let spec = NotebookSpec {
            session_id: session.id.clone(),
            dashboard_url: self.config.dashboard_url(),
            dataset_id: session.dataset_id.clone(),
            config: session.model_config.clone(),
            roboflow_api_key: self.config.roboflow.api_key.clone(),
            roboflow_workspace: self.config.roboflow.workspace.clone(),
            roboflow_project: self.config.roboflow.project_id.clone(),
            gemini_api_key: self.config.gemini.api_key.clone(),
            gemini_model: self.config.gemini.model.clone(),
        };
        let document = render_document(&spec)?;

        let notebook_dir = self.config.notebook_dir();
        std::fs::create_dir_all(&notebook_dir)
            .map_err(|err| AppError::Io(format!("cannot create notebook dir: {err}")))?;
        let notebook_path = notebook_dir.join(format!("colab_template_{}.ipynb", session.id));
        std::fs::write(&notebook_path, document)
            .map_err(|err| AppError::Io(format!("cannot write notebook artifact: {err}")))?;

        let colab_url = format!(
            "https://colab.research.google.com/create=true&templateId={}",
            session.id
        );
        session.mark_ready(colab_url, notebook_path);

        let stored = session.clone();
        self.sessions
            .update(move |records| {
                records.insert(stored.id.clone(), stored.clone());
                Ok(stored)
            })
            .await?;

        info!(session_id = %session.id, "colab training session created");
        Ok(session)
    }

    /// Apply one status callback from the external environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown session id, or
    /// `AppError::Store` when persistence fails.
    pub async fn record_status(
        &self,
        session_id: &str,
        status: SessionStatus,
        timestamp: Option<DateTime<Utc>>,
        payload: Map<String, Value>,
    ) -> Result<TrainingSession> {
        let id = session_id.to_owned();
        let session = self
            .sessions
            .update(move |records| {
                let session = records
                    .get_mut(&id)
                    .ok_or_else(|| AppError::NotFound(format!("training session {id} not found")))?;
                session.apply_status(status, timestamp, &payload);
                Ok(session.clone())
            })
            .await?;

        info!(session_id, status = ?status, "training status updated");
        Ok(session)
    }

    /// Apply the final-result callback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown session id, or
    /// `AppError::Store` when persistence fails.
    pub async fn record_result(
        &self,
        session_id: &str,
        status: Option<SessionStatus>,
        summary: Option<Value>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<TrainingSession> {
        let id = session_id.to_owned();
        let session = self
            .sessions
            .update(move |records| {
                let session = records
                    .get_mut(&id)
                    .ok_or_else(|| AppError::NotFound(format!("training session {id} not found")))?;
                session.apply_result(status, summary, timestamp);
                Ok(session.clone())
            })
            .await?;

        info!(session_id, "training result saved");
        Ok(session)
    }

    /// Record an operator stop request.
    ///
    /// Advisory only: the externally running notebook is not reachable from
    /// here, so nothing is forcibly halted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown session id, or
    /// `AppError::Store` when persistence fails.
    pub async fn stop(&self, session_id: &str) -> Result<TrainingSession> {
        let id = session_id.to_owned();
        let session = self
            .sessions
            .update(move |records| {
                let session = records
                    .get_mut(&id)
                    .ok_or_else(|| AppError::NotFound(format!("training session {id} not found")))?;
                session.apply_stop();
                Ok(session.clone())
            })
            .await?;

        info!(session_id, "training session stopped");
        Ok(session)
    }

    /// Store an explicit reconfiguration for a session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown session id, or
    /// `AppError::Store` when persistence fails.
    pub async fn reconfigure(&self, session_id: &str, config: Value) -> Result<TrainingSession> {
        let id = session_id.to_owned();
        self.sessions
            .update(move |records| {
                let session = records
                    .get_mut(&id)
                    .ok_or_else(|| AppError::NotFound(format!("training session {id} not found")))?;
                session.apply_reconfigure(config);
                Ok(session.clone())
            })
            .await
    }

    /// Retrieve a session by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the session does not exist.
    pub async fn get(&self, session_id: &str) -> Result<TrainingSession> {
        self.sessions
            .load()
            .await?
            .remove(session_id)
            .ok_or_else(|| AppError::NotFound(format!("training session {session_id} not found")))
    }

    /// List every session, unordered.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` when the store cannot be read.
    pub async fn list(&self) -> Result<Vec<TrainingSession>> {
        Ok(self.sessions.load().await?.into_values().collect())
    }

    /// Read the session's notebook artifact and schedule its cleanup.
    ///
    /// The artifact is single-use: after a successful read the file is
    /// deleted on a short delay (best-effort) and the session's
    /// `notebook_path` is cleared.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown session id, or
    /// `AppError::ArtifactMissing` when the notebook was already consumed
    /// or its file is gone.
    pub async fn take_notebook(&self, session_id: &str) -> Result<(String, Vec<u8>)> {
        let session = self.get(session_id).await?;
        let path = session.notebook_path.ok_or_else(|| {
            AppError::ArtifactMissing(format!("no notebook artifact for session {session_id}"))
        })?;

        let bytes = std::fs::read(&path).map_err(|err| {
            AppError::ArtifactMissing(format!("notebook {} unreadable: {err}", path.display()))
        })?;

        let id = session_id.to_owned();
        self.sessions
            .update(move |records| {
                if let Some(session) = records.get_mut(&id) {
                    session.notebook_path = None;
                    session.updated_at = Utc::now();
                }
                Ok(())
            })
            .await?;

        schedule_artifact_cleanup(path, self.config.timeouts.artifact_cleanup_seconds);

        Ok((format!("nutriscan_training_{session_id}.ipynb"), bytes))
    }
}

/// Delete a downloaded artifact after a short grace period.
///
/// Deletion is best-effort: a failure is logged and otherwise ignored, the
/// session record itself is unaffected.
fn schedule_artifact_cleanup(path: PathBuf, delay_seconds: u64) {
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(delay_seconds)).await;
        if let Err(err) = std::fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), %err, "failed to clean up notebook artifact");
            }
        }
    });
}
