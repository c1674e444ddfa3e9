//! JSON metadata sidecar written next to each downloaded item.
//!
//! The sidecar is the serialized [`ContentRecord`]: keys sorted, four-space
//! indentation, kinds as their slug and dates as ISO-8601. An existing sidecar
//! is left untouched.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument, warn};

use crate::model::ContentRecord;

/// Errors produced by sidecar generation.
#[derive(Debug, Error)]
pub enum SidecarError {
    /// I/O error writing the sidecar file to disk.
    #[error("I/O error writing sidecar {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Writes the sidecar for `record` to `dest_dir/filename`.
///
/// Returns `None` if the file already exists, `Some(path)` when it was
/// created.
///
/// # Errors
///
/// Returns [`SidecarError`] on I/O or serialization failure. A partially
/// written file is removed.
#[instrument(skip(record, dest_dir), fields(code = record.code, kind = %record.kind))]
pub async fn write_sidecar(
    record: &ContentRecord,
    dest_dir: &Path,
    filename: &str,
) -> Result<Option<PathBuf>, SidecarError> {
    let path = dest_dir.join(filename);
    let io_error = |source| SidecarError::Io {
        path: path.clone(),
        source,
    };

    // round-trip through Value so object keys come out sorted
    let value = serde_json::to_value(record)?;
    let contents = to_pretty_json(&value)?;

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
    {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Sidecar already exists, skipping");
            return Ok(None);
        }
        Err(err) => return Err(io_error(err)),
    };

    let write_result = match file.write_all(&contents).await {
        Ok(()) => file.flush().await,
        Err(err) => Err(err),
    };
    if let Err(err) = write_result {
        drop(file);
        if let Err(cleanup) = fs::remove_file(&path).await {
            warn!(path = %path.display(), error = %cleanup, "failed to remove partial sidecar");
        }
        return Err(io_error(err));
    }

    debug!(path = %path.display(), "Sidecar created");
    Ok(Some(path))
}

fn to_pretty_json(value: &serde_json::Value) -> Result<Vec<u8>, SidecarError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}
