//! Hegre Downloader Core Library
//!
//! Logs into a members account, discovers films and galleries and downloads
//! them with their metadata, skipping anything a previous run already
//! fetched.
//!
//! # Architecture
//!
//! - [`session`] - Authenticated HTTP session, page and streamed GETs
//! - [`listing`] - Paginated listing crawl
//! - [`parser`] - Detail page parsing into [`ContentRecord`]s
//! - [`resolve`] - Resolution selection for media and trailers
//! - [`download`] - Retrying single-file transfers and the filename scheme
//! - [`archive`] - Persistent set of already downloaded items
//! - [`sidecar`] - JSON metadata sidecars
//! - [`orchestrator`] - URL classification and the per-item pipeline
//! - [`config`] - Run configuration and the config file
//! - [`progress`] - Progress and console reporting

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod config;
pub mod download;
pub mod listing;
pub mod model;
pub mod orchestrator;
pub mod parser;
pub mod progress;
pub mod resolve;
pub mod session;
pub mod sidecar;

mod selectors;
mod user_agent;

// Re-export commonly used types
pub use archive::{Archive, ArchiveError};
pub use config::{AssetPlan, Configuration, FileConfig, load_file_config};
pub use download::{
    DEFAULT_MAX_ATTEMPTS, DownloadError, FailureType, RetryDecision, RetryPolicy,
    RetryingDownloader, Transfer, classify_error,
};
pub use listing::{CrawlError, ListingCrawler, ListingEndpoint, ListingSection};
pub use model::{
    ContentKind, ContentRecord, ItemRef, Person, SortOption, convert_size, duration_to_seconds,
};
pub use orchestrator::{ItemError, ItemOutcome, Orchestrator, RunStats, Target, classify};
pub use parser::{DetailParser, HegreParser, ParseError};
pub use progress::{ConsoleProgress, ProgressSink, SilentProgress, TaskId};
pub use resolve::{ResolveError, resolve};
pub use session::{PageSource, SessionClient, SessionError, SessionPreferences, StreamHandle};
pub use sidecar::{SidecarError, write_sidecar};
