//! Error types for the download module.
//!
//! Every variant carries the URL or path it concerns so a failure can be
//! reported on its own line without further context.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionError;

/// Errors that can occur while transferring a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The final file already exists. Expected on re-runs; never retried.
    #[error("{} exists already", .path.display())]
    AlreadyDownloaded {
        /// The existing file.
        path: PathBuf,
    },

    /// A download was attempted on a session that has not logged in.
    #[error("no active session, log in first")]
    NotAuthenticated,

    /// Network-level error (DNS resolution, connection reset, TLS errors, etc.)
    #[error("network error downloading {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout downloading {url}")]
    Timeout { url: String },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} downloading {url}")]
    HttpStatus { url: String, status: u16 },

    /// The body ended before the announced Content-Length was reached.
    #[error("transfer of {url} ended early: expected {expected} bytes, received {received}")]
    Truncated {
        url: String,
        expected: u64,
        received: u64,
    },

    /// File system error while writing or promoting the file.
    #[error("IO error writing to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or has no file name.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl DownloadError {
    /// Creates an already-downloaded signal for `path`.
    pub fn already_downloaded(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyDownloaded { path: path.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates a truncation error.
    pub fn truncated(url: impl Into<String>, expected: u64, received: u64) -> Self {
        Self::Truncated {
            url: url.into(),
            expected,
            received,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

// Session errors already carry their URL, so this conversion keeps all context.
impl From<SessionError> for DownloadError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Auth { .. } | SessionError::NotAuthenticated => Self::NotAuthenticated,
            SessionError::Network { url, source } => Self::Network { url, source },
            SessionError::Timeout { url } => Self::Timeout { url },
            SessionError::HttpStatus { url, status } => Self::HttpStatus { url, status },
            SessionError::InvalidUrl { url } => Self::InvalidUrl { url },
        }
    }
}
