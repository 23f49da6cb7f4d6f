//! Blob store - Directory-backed storage for uploaded files.
//!
//! The database only ever holds the handle (the stored file name); bytes live
//! under the store's root directory. Names handed to [`BlobStore::put`] must be
//! a single path component.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of a stored blob, relative to its store's root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BlobHandle(String);

impl BlobHandle {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// A file listed from a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobEntry {
    pub filename: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Files under one directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

/// Replaces characters that could escape the store directory or confuse
/// the filesystem.
#[must_use]
pub fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Reduces a client-supplied file name to its last path component.
#[must_use]
pub fn client_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    sanitize_component(last)
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root directory if it is missing.
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Writes `bytes` under `name`, replacing any existing blob of that name.
    pub async fn put(&self, name: &str, bytes: &[u8]) -> Result<BlobHandle> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\'])
        {
            return Err(Error::invalid_input(format!("invalid file name '{name}'")));
        }

        self.ensure_root().await?;
        let path = self.root.join(name);
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(BlobHandle(name.to_string()))
    }

    /// Deletes a stored blob. A blob that is already gone is not an error.
    pub async fn remove(&self, handle: &BlobHandle) -> Result<()> {
        match tokio::fs::remove_file(self.root.join(handle.as_str())).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Size in bytes of a stored blob.
    pub async fn size(&self, handle: &BlobHandle) -> Result<u64> {
        let metadata = tokio::fs::metadata(self.root.join(handle.as_str())).await?;
        Ok(metadata.len())
    }

    /// Lists regular files in the store, sorted by name.
    ///
    /// A root directory that does not exist yet lists as empty.
    pub async fn list(&self) -> Result<Vec<BlobEntry>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            entries.push(BlobEntry {
                filename: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified: metadata.modified()?.into(),
            });
        }
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(entries)
    }
}
