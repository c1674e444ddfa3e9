//! Chunked streaming of response bodies.

use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use super::SessionError;

/// Size of the chunks handed out by [`StreamHandle::next_chunk`] (16 KiB).
pub const CHUNK_SIZE: usize = 16 * 1024;

/// An open streamed GET response.
///
/// The body is never buffered as a whole: network frames are split into
/// chunks of at most [`CHUNK_SIZE`] bytes as they are consumed.
pub struct StreamHandle {
    url: String,
    content_length: Option<u64>,
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    pending: Bytes,
}

impl StreamHandle {
    pub(crate) fn new(url: impl Into<String>, response: reqwest::Response) -> Self {
        Self {
            url: url.into(),
            content_length: response.content_length(),
            body: response.bytes_stream().boxed(),
            pending: Bytes::new(),
        }
    }

    /// The requested URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Body length announced by the server, if any.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// Returns the next chunk of the body, or `None` once it is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Network`] or [`SessionError::Timeout`] when the
    /// connection fails mid-body.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>, SessionError> {
        while self.pending.is_empty() {
            match self.body.next().await {
                Some(Ok(frame)) => self.pending = frame,
                Some(Err(e)) => return Err(SessionError::transport(self.url.clone(), e)),
                None => return Ok(None),
            }
        }

        let take = self.pending.len().min(CHUNK_SIZE);
        Ok(Some(self.pending.split_to(take)))
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("url", &self.url)
            .field("content_length", &self.content_length)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}
