use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::store_document::StoreDocument;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("timed out waiting for the store write lock")]
    Busy,

    #[error("failed to read analytics document: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to write analytics document: {0:#}")]
    Write(anyhow::Error),
}

/// What an `update` closure wants done with the mutated document.
pub enum Commit<T> {
    Write(T),
    Skip(T),
}

/// JSON file backed store for the analytics document.
///
/// Every write replaces the whole document. Mutations must go through
/// [`EventStore::update`], which holds the write lock across the full
/// read-modify-write cycle.
pub struct EventStore {
    path: PathBuf,
    write_lock: Mutex<()>,
    lock_timeout: Duration,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            lock_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the document. A missing or unparsable file yields an empty document;
    /// any other I/O failure is returned.
    pub async fn load(&self) -> Result<StoreDocument, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!(
                    "No analytics document at {}, starting empty",
                    self.path.display()
                );
                return Ok(StoreDocument::default());
            }
            Err(e) => return Err(StoreError::Read(e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                log::warn!(
                    "Analytics document {} is corrupt ({}), starting empty",
                    self.path.display(),
                    e
                );
                Ok(StoreDocument::default())
            }
        }
    }

    /// Like [`EventStore::load`] but never fails.
    pub async fn read(&self) -> StoreDocument {
        self.load().await.unwrap_or_else(|e| {
            log::warn!("{}, substituting an empty document", e);
            StoreDocument::default()
        })
    }

    /// Persist the entire document. Failures are logged and reported as `false`.
    pub async fn write(&self, doc: &StoreDocument) -> bool {
        match self.persist(doc).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to write {}: {:#}", self.path.display(), e);
                false
            }
        }
    }

    /// Create an empty document on first run.
    pub async fn ensure_exists(&self) {
        if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return;
        }
        if self.write(&StoreDocument::default()).await {
            log::info!("Created empty analytics document at {}", self.path.display());
        }
    }

    /// Serialized read-modify-write. The document is only persisted when the
    /// closure returns [`Commit::Write`]; on a failed write the mutated copy is dropped.
    pub async fn update<T, F>(&self, mutate: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreDocument) -> Commit<T>,
    {
        let _guard = tokio::time::timeout(self.lock_timeout, self.write_lock.lock())
            .await
            .map_err(|_| StoreError::Busy)?;

        let mut doc = self.load().await?;
        match mutate(&mut doc) {
            Commit::Write(out) => {
                self.persist(&doc).await.map_err(StoreError::Write)?;
                Ok(out)
            }
            Commit::Skip(out) => Ok(out),
        }
    }

    async fn persist(&self, doc: &StoreDocument) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let body = serde_json::to_vec_pretty(doc).context("serializing analytics document")?;

        // Write beside the target then rename so readers never see a torn file
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("renaming {} into place", tmp.display()))?;

        Ok(())
    }
}
