//! Whole-document JSON collection store.
//!
//! Each entity collection lives in one JSON file holding a mapping from
//! record id to record, rewritten wholesale on every mutation. Writes go
//! through a temp-file-then-rename swap so a concurrent reader never sees a
//! partial document, and every read-modify-write cycle runs under the
//! collection's async mutex so concurrent updates serialize instead of
//! overwriting each other.

use std::collections::BTreeMap;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{AppError, Result};

/// Serialized JSON store for one entity collection.
pub struct JsonStore<T> {
    path: PathBuf,
    permissive: bool,
    lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a store backed by `dir/<name>.json`.
    ///
    /// With `permissive` set, an unreadable or corrupt document loads as an
    /// empty collection instead of failing. That is the original dashboard's
    /// behavior, kept as an opt-in compatibility mode.
    #[must_use]
    pub fn open(dir: &Path, name: &str, permissive: bool) -> Self {
        Self {
            path: dir.join(format!("{name}.json")),
            permissive,
            lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    /// Path of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection.
    ///
    /// A missing file is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` when the document is unreadable or corrupt,
    /// unless the store was opened permissive.
    pub async fn load(&self) -> Result<BTreeMap<String, T>> {
        let _guard = self.lock.lock().await;
        self.load_unlocked()
    }

    /// Replace the full collection on disk.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` when serialization or the atomic swap fails.
    pub async fn save(&self, records: &BTreeMap<String, T>) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.save_unlocked(records)
    }

    /// Run one serialized read-modify-write transaction.
    ///
    /// The closure receives the current collection and may mutate it; the
    /// mutated collection is persisted before the lock is released, so two
    /// concurrent updates can never lose each other's writes.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or `AppError::Store` when the load or
    /// the persist step fails. The document is not rewritten when the
    /// closure fails.
    pub async fn update<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut BTreeMap<String, T>) -> Result<R>,
    {
        let _guard = self.lock.lock().await;
        let mut records = self.load_unlocked()?;
        let outcome = f(&mut records)?;
        self.save_unlocked(&records)?;
        Ok(outcome)
    }

    fn load_unlocked(&self) -> Result<BTreeMap<String, T>> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(err) => {
                if self.permissive {
                    warn!(path = %self.path.display(), %err, "unreadable store, using empty collection");
                    return Ok(BTreeMap::new());
                }
                return Err(AppError::Store(format!(
                    "cannot read {}: {err}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_slice(&raw) {
            Ok(records) => Ok(records),
            Err(err) if self.permissive => {
                warn!(path = %self.path.display(), %err, "corrupt store, using empty collection");
                Ok(BTreeMap::new())
            }
            Err(err) => Err(AppError::Store(format!(
                "corrupt document {}: {err}",
                self.path.display()
            ))),
        }
    }

    fn save_unlocked(&self, records: &BTreeMap<String, T>) -> Result<()> {
        let parent = self.path.parent().ok_or_else(|| {
            AppError::Store(format!("{} has no parent directory", self.path.display()))
        })?;
        std::fs::create_dir_all(parent)
            .map_err(|err| AppError::Store(format!("cannot create store dir: {err}")))?;

        let payload = serde_json::to_vec_pretty(records)
            .map_err(|err| AppError::Store(format!("cannot serialize collection: {err}")))?;

        // Write-then-rename keeps the swap atomic for concurrent readers.
        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|err| AppError::Store(format!("cannot create temp file: {err}")))?;
        tmp.write_all(&payload)
            .map_err(|err| AppError::Store(format!("cannot write temp file: {err}")))?;
        tmp.persist(&self.path).map_err(|err| {
            AppError::Store(format!("cannot persist {}: {err}", self.path.display()))
        })?;
        Ok(())
    }
}
