//! Configuration artifact persistence.
//!
//! # Responsibilities
//! - Own the single configuration file read by the supervised process
//! - Replace its content atomically (write sibling temp file, then rename)
//!
//! # Design Decisions
//! - No diffing here; the reconciler only calls persist on change
//! - Rename keeps readers from ever seeing a half-written file

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::render::ConfigDocument;

/// Failed to write the configuration artifact.
#[derive(Debug, thiserror::Error)]
#[error("failed to persist config to {path}: {source}")]
pub struct PersistError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Writes configuration documents to a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file content with `document`.
    pub async fn persist(&self, document: &ConfigDocument) -> Result<(), PersistError> {
        let staging = self.staging_path();
        let result = self.write_and_swap(&staging, document).await;
        if result.is_err() {
            let _ = tokio::fs::remove_file(&staging).await;
        }
        result.map_err(|source| PersistError {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), bytes = document.len(), "Config persisted");
        Ok(())
    }

    async fn write_and_swap(&self, staging: &Path, document: &ConfigDocument) -> std::io::Result<()> {
        let mut file = tokio::fs::File::create(staging).await?;
        file.write_all(document.as_str().as_bytes()).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(staging, &self.path).await
    }

    /// Same directory as the target so the rename stays on one filesystem.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("config"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
