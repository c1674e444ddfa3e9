//! Paginated listing crawl.
//!
//! A listing endpoint is requested page by page (`?films_page=1`,
//! `?films_page=2`, ...) with the sort order threaded through unchanged. The
//! crawl ends only when a page shows the "no results" marker; a page that
//! merely contains no items does not end it.

mod page;

use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

pub(crate) use page::kind_from_path;

use crate::model::{ItemRef, SortOption};
use crate::progress::ProgressSink;
use crate::session::{PageSource, SessionError};

/// Which listing block of a page to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSection {
    /// Films, massage and sex education items (`#films-listing`).
    Films,
    /// Photo galleries (`#galleries-listing`).
    Galleries,
}

impl ListingSection {
    fn query_prefix(self) -> &'static str {
        match self {
            Self::Films => "films",
            Self::Galleries => "galleries",
        }
    }
}

/// A paginated listing: a page URL plus the section to read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEndpoint {
    pub url: Url,
    pub section: ListingSection,
}

impl ListingEndpoint {
    #[must_use]
    pub fn new(url: Url, section: ListingSection) -> Self {
        Self { url, section }
    }

    /// URL of page `page` (1-based) in the given sort order.
    #[must_use]
    pub fn page_url(&self, sort: SortOption, page: u32) -> Url {
        let prefix = self.section.query_prefix();
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair(&format!("{prefix}_sort"), sort.as_query_value())
            .append_pair(&format!("{prefix}_page"), &page.to_string());
        url
    }
}

/// A listing page could not be fetched.
#[derive(Debug, Error)]
#[error("failed to fetch listing page {page} of {url}")]
pub struct CrawlError {
    pub url: String,
    pub page: u32,
    #[source]
    pub source: SessionError,
}

/// Walks listing pages until the end-of-results marker.
pub struct ListingCrawler<'a> {
    source: &'a dyn PageSource,
    progress: &'a dyn ProgressSink,
}

impl<'a> ListingCrawler<'a> {
    #[must_use]
    pub fn new(source: &'a dyn PageSource, progress: &'a dyn ProgressSink) -> Self {
        Self { source, progress }
    }

    /// Collects every item of `endpoint` in listing order.
    ///
    /// Page fetches are not retried; a failed fetch aborts the crawl.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError`] naming the page that could not be fetched.
    #[instrument(skip(self), fields(url = %endpoint.url, section = ?endpoint.section))]
    pub async fn crawl(
        &self,
        endpoint: &ListingEndpoint,
        sort: SortOption,
    ) -> Result<Vec<ItemRef>, CrawlError> {
        let task = self
            .progress
            .add_task(&format!("Crawling {}", endpoint.url));
        let mut items = Vec::new();
        let mut page = 1_u32;

        loop {
            let page_url = endpoint.page_url(sort, page);
            let html = match self.source.fetch_page(page_url.as_str()).await {
                Ok(html) => html,
                Err(source) => {
                    self.progress.fail_task(task);
                    return Err(CrawlError {
                        url: endpoint.url.to_string(),
                        page,
                        source,
                    });
                }
            };

            let listing = page::parse_listing_page(&html, &page_url, endpoint.section);
            if listing.exhausted {
                debug!(page, "no results marker found");
                break;
            }

            debug!(page, count = listing.items.len(), "listing page parsed");
            self.progress.advance(task, listing.items.len() as u64);
            items.extend(listing.items);
            page += 1;
        }

        self.progress.finish_task(task);
        info!(items = items.len(), pages = page, "listing crawl complete");
        Ok(items)
    }
}
