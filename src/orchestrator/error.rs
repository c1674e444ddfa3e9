//! Per-item error type.

use thiserror::Error;

use crate::archive::ArchiveError;
use crate::download::DownloadError;
use crate::listing::CrawlError;
use crate::parser::ParseError;
use crate::resolve::ResolveError;
use crate::session::SessionError;
use crate::sidecar::SidecarError;

/// Why a URL or an item could not be processed.
///
/// These never abort a run; the orchestrator logs them and moves on to the
/// next item.
#[derive(Debug, Error)]
pub enum ItemError {
    /// The URL names nothing this tool can download.
    #[error("unsupported URL: {url}")]
    UnsupportedUrl { url: String },

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Sidecar(#[from] SidecarError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

impl ItemError {
    #[must_use]
    pub fn unsupported_url(url: impl Into<String>) -> Self {
        Self::UnsupportedUrl { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_url_message() {
        let err = ItemError::unsupported_url("https://example.com/x");
        assert_eq!(err.to_string(), "unsupported URL: https://example.com/x");
    }

    #[test]
    fn test_wrapped_errors_keep_their_message() {
        let err = ItemError::from(ResolveError::NoVariants);
        assert_eq!(err.to_string(), "no resolutions available");
    }
}
