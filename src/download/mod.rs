//! File transfers with retries and atomic promotion.
//!
//! # Features
//!
//! - Streaming downloads in 16 KiB chunks
//! - `.temp` staging file, renamed to the final name only when complete
//! - Already-downloaded short-circuit before any request is sent
//! - Bounded retries of transient failures with exponential backoff
//! - Deterministic output names derived from the content record

mod downloader;
mod error;
mod filename;
mod retry;

pub use downloader::{RetryingDownloader, Transfer};
pub use error::DownloadError;
pub use filename::{TEMP_SUFFIX, asset_filename, original_filename, sidecar_filename};
pub use retry::{DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error};
