//! Download orchestration.
//!
//! Input URLs are classified into single items and collections. Collections
//! are expanded through the listing crawler, then every item runs the same
//! pipeline:
//!
//! 1. archive check (before fetching when the listing exposed the code)
//! 2. detail page fetch and parse
//! 3. archive check on the parsed record
//! 4. primary media, sidecar, thumbnail, subtitles, screengrab, trailer
//! 5. archive update
//!
//! Items run sequentially with a parallelism of 1, otherwise on a bounded
//! pool of tokio tasks. A failing URL or item is logged and never stops the
//! others.

mod error;
mod stats;
mod target;

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};
use url::Url;

pub use error::ItemError;
pub use stats::RunStats;
pub use target::{Target, classify};

use crate::archive::Archive;
use crate::config::Configuration;
use crate::download::{
    DownloadError, RetryPolicy, RetryingDownloader, asset_filename, sidecar_filename,
};
use crate::listing::ListingCrawler;
use crate::model::{ContentRecord, ItemRef};
use crate::parser::DetailParser;
use crate::progress::ProgressSink;
use crate::resolve::resolve;
use crate::session::SessionClient;
use crate::sidecar::write_sidecar;

/// Result of a successfully processed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Assets were downloaded.
    Completed,
    /// The item was archived or its primary media already existed.
    Skipped,
}

/// Drives discovery and downloads for a run.
///
/// Cloning is cheap; clones share the session, archive and progress sink.
#[derive(Clone)]
pub struct Orchestrator {
    session: Arc<SessionClient>,
    parser: Arc<dyn DetailParser>,
    downloader: RetryingDownloader,
    archive: Arc<Archive>,
    progress: Arc<dyn ProgressSink>,
    config: Arc<Configuration>,
}

impl Orchestrator {
    /// Creates an orchestrator over an already logged-in session.
    #[must_use]
    pub fn new(
        session: Arc<SessionClient>,
        parser: Arc<dyn DetailParser>,
        archive: Arc<Archive>,
        progress: Arc<dyn ProgressSink>,
        config: Configuration,
        policy: RetryPolicy,
    ) -> Self {
        let downloader =
            RetryingDownloader::new(Arc::clone(&session), Arc::clone(&progress), policy);
        Self {
            session,
            parser,
            downloader,
            archive,
            progress,
            config: Arc::new(config),
        }
    }

    /// Processes every URL and returns the run statistics.
    ///
    /// Unsupported URLs, failed crawls and failed items are counted as
    /// failures; none of them aborts the run.
    #[instrument(skip(self, urls), fields(urls = urls.len(), parallel = self.config.parallel))]
    pub async fn run(&self, urls: &[String]) -> Arc<RunStats> {
        let stats = Arc::new(RunStats::new());
        let items = self.collect_items(urls, &stats).await;
        info!(items = items.len(), "processing items");

        if self.config.parallel <= 1 {
            for item in items {
                self.process_and_record(&item, &stats).await;
            }
        } else {
            self.process_concurrently(items, &stats).await;
        }

        info!(
            completed = stats.completed(),
            skipped = stats.skipped(),
            failed = stats.failed(),
            retried = stats.retried(),
            bytes = stats.bytes(),
            "run complete"
        );
        stats
    }

    /// Expands URLs into items in submission order, dropping repeats.
    async fn collect_items(&self, urls: &[String], stats: &RunStats) -> Vec<ItemRef> {
        let mut seen = HashSet::new();
        let mut items = Vec::new();

        for raw in urls {
            match self.expand(raw).await {
                Ok(expanded) => {
                    for item in expanded {
                        if seen.insert(item.url.clone()) {
                            items.push(item);
                        } else {
                            debug!(url = %item.url, "item already scheduled");
                        }
                    }
                }
                Err(e) => {
                    stats.increment_failed();
                    self.report_failure(raw, &e);
                }
            }
        }
        items
    }

    /// Classifies one URL and crawls it if it is a collection.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::UnsupportedUrl`] or [`ItemError::Crawl`].
    pub async fn expand(&self, raw: &str) -> Result<Vec<ItemRef>, ItemError> {
        let target =
            classify(raw, self.session.base_url()).ok_or_else(|| ItemError::unsupported_url(raw))?;
        if let Target::Item(item) = target {
            return Ok(vec![item]);
        }

        let crawler = ListingCrawler::new(self.session.as_ref(), self.progress.as_ref());
        let mut items = Vec::new();
        for endpoint in target.endpoints() {
            items.extend(crawler.crawl(&endpoint, self.config.sort).await?);
        }
        Ok(items)
    }

    async fn process_concurrently(&self, items: Vec<ItemRef>, stats: &Arc<RunStats>) {
        let semaphore = Arc::new(Semaphore::new(self.config.parallel));
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                warn!("worker pool closed unexpectedly");
                break;
            };
            let worker = self.clone();
            let stats = Arc::clone(stats);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                worker.process_and_record(&item, &stats).await;
            }));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "item task panicked");
                stats.increment_failed();
            }
        }
    }

    async fn process_and_record(&self, item: &ItemRef, stats: &RunStats) {
        match self.process_item(item, stats).await {
            Ok(ItemOutcome::Completed) => stats.increment_completed(),
            Ok(ItemOutcome::Skipped) => stats.increment_skipped(),
            Err(e) => {
                stats.increment_failed();
                self.report_failure(&item.url, &e);
            }
        }
    }

    /// Runs the full pipeline for one item.
    ///
    /// # Errors
    ///
    /// Returns the first error that prevents the primary media, sidecar or
    /// archive entry from being produced. Failed thumbnails, subtitles,
    /// screengrabs and trailers are reported but do not fail the item.
    #[instrument(skip(self, item, stats), fields(url = %item.url, kind = %item.kind))]
    pub async fn process_item(
        &self,
        item: &ItemRef,
        stats: &RunStats,
    ) -> Result<ItemOutcome, ItemError> {
        if let Some(key) = item.archive_key()
            && self.archive.contains(&key).await
        {
            self.report_skip(&item.url, "already in archive");
            return Ok(ItemOutcome::Skipped);
        }

        let record = self.fetch_record(item).await?;
        if self.archive.contains(&record.archive_key()).await {
            self.report_skip(&record.to_string(), "already in archive");
            return Ok(ItemOutcome::Skipped);
        }

        let assets = self.config.assets;
        let dest = self.config.destination.as_path();
        let (resolution, primary_url) = resolve(&record.variants, self.config.resolution)?;
        debug!(code = record.code, resolution, "resolved primary media");

        let mut outcome = ItemOutcome::Completed;
        if assets.media {
            let filename = asset_filename(&record, primary_url)?;
            match self
                .downloader
                .download_with_retries(primary_url, dest, &filename, self.config.max_attempts)
                .await
            {
                Ok(transfer) => stats.record_transfer(transfer.bytes, transfer.attempts),
                Err(DownloadError::AlreadyDownloaded { path }) => {
                    self.report_skip(&record.to_string(), &format!("{} exists", path.display()));
                    outcome = ItemOutcome::Skipped;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if assets.metadata {
            let filename = sidecar_filename(&record, primary_url)?;
            match write_sidecar(&record, dest, &filename).await? {
                Some(path) => debug!(path = %path.display(), "sidecar written"),
                None => debug!(filename, "sidecar already present"),
            }
        }

        if assets.thumbnail
            && let Some(cover) = record.cover_url.as_deref()
        {
            self.fetch_extra(&record, "thumbnail", cover, stats).await;
        }

        if assets.subtitles {
            for (language, url) in record.subtitle_urls(&self.config.subtitle_languages) {
                self.fetch_extra(&record, &format!("{language} subtitles"), url, stats)
                    .await;
            }
        }

        if assets.screengrab
            && let Some(screengrab) = record.screengrab_url.as_deref()
        {
            self.fetch_extra(&record, "screengrab", screengrab, stats).await;
        }

        if assets.trailer && !record.trailer_variants.is_empty() {
            match resolve(&record.trailer_variants, self.config.trailer_resolution) {
                Ok((_, trailer)) => self.fetch_extra(&record, "trailer", trailer, stats).await,
                Err(e) => self.report_warning(&record, "trailer", &e),
            }
        }

        if assets.media {
            self.archive.add(&record.archive_key()).await?;
        }

        Ok(outcome)
    }

    async fn fetch_record(&self, item: &ItemRef) -> Result<ContentRecord, ItemError> {
        let url = Url::parse(&item.url).map_err(|_| ItemError::unsupported_url(&item.url))?;
        let html = self.session.get_text(url.as_str()).await?;
        let record = self.parser.parse(&html, &url)?;
        debug!(code = record.code, variants = record.variants.len(), "parsed detail page");
        Ok(record)
    }

    /// Downloads a secondary asset, reporting instead of propagating failures.
    async fn fetch_extra(&self, record: &ContentRecord, what: &str, url: &str, stats: &RunStats) {
        let filename = match asset_filename(record, url) {
            Ok(filename) => filename,
            Err(e) => {
                self.report_warning(record, what, &e);
                return;
            }
        };

        let dest = self.config.destination.as_path();
        match self
            .downloader
            .download_with_retries(url, dest, &filename, self.config.max_attempts)
            .await
        {
            Ok(transfer) => stats.record_transfer(transfer.bytes, transfer.attempts),
            Err(DownloadError::AlreadyDownloaded { .. }) => {
                debug!(filename, what, "already present");
            }
            Err(e) => self.report_warning(record, what, &e),
        }
    }

    fn report_skip(&self, subject: &str, reason: &str) {
        info!(subject, reason, "skipping");
        self.progress.message(&format!("Skipping {subject}: {reason}"));
    }

    fn report_warning(&self, record: &ContentRecord, what: &str, error: &dyn std::error::Error) {
        warn!(code = record.code, kind = %record.kind, what, error = %error, "asset failed");
        self.progress
            .message(&format!("Could not download {what} for {record}: {error}"));
    }

    fn report_failure(&self, subject: &str, error: &ItemError) {
        warn!(subject, error = %error, "item failed");
        self.progress
            .message(&format!("Failed to process {subject}: {error}"));
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("base_url", &self.session.base_url().as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
