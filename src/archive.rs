//! Persistent record of fully downloaded items.
//!
//! The archive file holds one key per line (`"<kind-slug> <code>"`). It is read
//! once at startup and appended to as items complete; existing lines are never
//! rewritten. The in-memory set and the file append share one lock, so workers
//! finishing concurrently cannot interleave partial lines.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// The archive file could not be read or appended to.
#[derive(Debug, Error)]
#[error("archive file {}: {source}", .path.display())]
pub struct ArchiveError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Set of archive keys, optionally backed by a file.
#[derive(Debug, Default)]
pub struct Archive {
    path: Option<PathBuf>,
    keys: Mutex<HashSet<String>>,
}

impl Archive {
    /// An archive that only lives for this run.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the archive at `path`. A missing file is an empty archive.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError`] if the file exists but cannot be read.
    #[instrument]
    pub async fn load(path: &Path) -> Result<Self, ArchiveError> {
        let keys: HashSet<String> = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(ToString::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(source) => {
                return Err(ArchiveError {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        info!(entries = keys.len(), "archive loaded");
        Ok(Self {
            path: Some(path.to_path_buf()),
            keys: Mutex::new(keys),
        })
    }

    /// Whether `key` has been recorded.
    pub async fn contains(&self, key: &str) -> bool {
        self.keys.lock().await.contains(key)
    }

    /// Number of recorded keys.
    pub async fn len(&self) -> usize {
        self.keys.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Records `key`, appending it to the backing file if it is new.
    ///
    /// Returns `false` when the key was already present.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError`] if the append fails; the key stays recorded in
    /// memory for the rest of the run.
    pub async fn add(&self, key: &str) -> Result<bool, ArchiveError> {
        let mut keys = self.keys.lock().await;
        if !keys.insert(key.to_string()) {
            return Ok(false);
        }

        if let Some(path) = &self.path {
            append_line(path, key).await.map_err(|source| ArchiveError {
                path: path.clone(),
                source,
            })?;
        }
        debug!(key, "archived");
        Ok(true)
    }
}

async fn append_line(path: &Path, key: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(format!("{key}\n").as_bytes()).await?;
    file.flush().await
}
