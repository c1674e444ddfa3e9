//! Error types for the session client.

use thiserror::Error;

/// Errors raised by [`SessionClient`](super::SessionClient) operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login failed. The run cannot proceed without a session.
    #[error("login failed: {message}")]
    Auth {
        /// What went wrong, including the server response when available.
        message: String,
    },

    /// An authenticated operation was attempted before a successful login.
    #[error("no active session, log in first")]
    NotAuthenticated,

    /// Connection, TLS or body decoding failure.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timeout fetching {url}")]
    Timeout { url: String },

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl SessionError {
    /// Creates an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Maps a transport error, separating timeouts from other failures.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { url: url.into() }
        } else {
            Self::Network {
                url: url.into(),
                source,
            }
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}
