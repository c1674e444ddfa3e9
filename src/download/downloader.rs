//! Retrying single-file transfers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};

use super::filename::TEMP_SUFFIX;
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use super::DownloadError;
use crate::progress::{ProgressSink, TaskId};
use crate::session::SessionClient;

/// Result of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Final path of the file.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}

/// Streams remote files to disk through a temporary file.
///
/// Each attempt writes `{filename}.temp` next to the destination and only a
/// complete body is renamed to the final name. A failed attempt deletes its
/// temporary file before the next one starts, so an interrupted run leaves at
/// most one `.temp` file per in-flight transfer and never a partial final file.
#[derive(Clone)]
pub struct RetryingDownloader {
    session: Arc<SessionClient>,
    progress: Arc<dyn ProgressSink>,
    policy: RetryPolicy,
}

impl RetryingDownloader {
    #[must_use]
    pub fn new(
        session: Arc<SessionClient>,
        progress: Arc<dyn ProgressSink>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            session,
            progress,
            policy,
        }
    }

    /// Downloads `url` to `dest_dir/filename`, making at most `max_attempts`
    /// attempts.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::AlreadyDownloaded`] if the final file exists; no
    ///   request is sent.
    /// - The error of the last attempt once transient failures exhaust
    ///   `max_attempts`.
    /// - Permanent errors ([`DownloadError::Io`], [`DownloadError::NotAuthenticated`],
    ///   [`DownloadError::InvalidUrl`]) immediately.
    #[instrument(skip(self, dest_dir), fields(url = %url, filename = %filename))]
    pub async fn download_with_retries(
        &self,
        url: &str,
        dest_dir: &Path,
        filename: &str,
        max_attempts: u32,
    ) -> Result<Transfer, DownloadError> {
        let final_path = dest_dir.join(filename);
        let exists = tokio::fs::try_exists(&final_path)
            .await
            .map_err(|e| DownloadError::io(&final_path, e))?;
        if exists {
            return Err(DownloadError::already_downloaded(final_path));
        }

        let temp_path = dest_dir.join(format!("{filename}{TEMP_SUFFIX}"));
        let max_attempts = max_attempts.max(1);
        let mut task = self.progress.add_task(filename);
        let mut attempt = 1;

        loop {
            let error = match self.transfer(url, &temp_path, task).await {
                Ok(bytes) => match tokio::fs::rename(&temp_path, &final_path).await {
                    Ok(()) => {
                        self.progress.finish_task(task);
                        info!(path = %final_path.display(), bytes, attempt, "download complete");
                        return Ok(Transfer {
                            path: final_path,
                            bytes,
                            attempts: attempt,
                        });
                    }
                    Err(e) => DownloadError::io(&final_path, e),
                },
                Err(error) => error,
            };

            remove_temp_file(&temp_path).await;
            self.progress.fail_task(task);

            match self
                .policy
                .should_retry(classify_error(&error), attempt, max_attempts)
            {
                RetryDecision::Retry {
                    delay,
                    attempt: next,
                } => {
                    warn!(attempt, error = %error, "download attempt failed, retrying");
                    self.progress.message(&format!(
                        "Failed attempt {attempt} to download '{filename}': {error}"
                    ));
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt = next;
                    task = self.progress.add_task(filename);
                }
                RetryDecision::DoNotRetry { reason } => {
                    debug!(attempt, reason, "giving up");
                    return Err(error);
                }
            }
        }
    }

    /// One attempt: stream the body into `temp_path`.
    async fn transfer(
        &self,
        url: &str,
        temp_path: &Path,
        task: TaskId,
    ) -> Result<u64, DownloadError> {
        let mut stream = self.session.get_stream(url).await?;
        let expected = stream.content_length();
        if let Some(total) = expected {
            self.progress.set_total(task, total);
        }

        let file = File::create(temp_path)
            .await
            .map_err(|e| DownloadError::io(temp_path, e))?;
        let mut writer = BufWriter::new(file);
        let mut received: u64 = 0;

        while let Some(chunk) = stream.next_chunk().await? {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(temp_path, e))?;
            received += chunk.len() as u64;
            self.progress.advance(task, chunk.len() as u64);
        }

        writer
            .flush()
            .await
            .map_err(|e| DownloadError::io(temp_path, e))?;

        if let Some(expected) = expected
            && received != expected
        {
            return Err(DownloadError::truncated(url, expected, received));
        }
        Ok(received)
    }
}

impl std::fmt::Debug for RetryingDownloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingDownloader")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

async fn remove_temp_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove partial file"),
    }
}
