//! Crawl session: one pooled client and one pacer for the length of a run
//!
//! A session is created per crawl run and dropped when the run ends, which
//! releases the connection pool. All fetches within it are awaited one at a
//! time, in order.

use super::fetcher::{FetchClient, FetchError};
use super::pacer::Pacer;
use crate::config::Config;
use crate::extract::{detail_extractor, listing_url, parse_listing};
use crate::record::{DetailRecord, ListingEntry, ListingErrorMarker, Source};
use crate::url::parse_base;
use crate::{ConfigError, Result};
use std::collections::HashSet;
use std::time::Instant;
use url::Url;

/// Result of one listing crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRun {
    /// Records and error markers in page order
    pub entries: Vec<ListingEntry>,
    /// Pages walked, after clamping to the configured cap
    pub pages: u32,
}

/// Owns the network resources of one crawl run
#[derive(Debug)]
pub struct CrawlSession {
    client: FetchClient,
    pacer: Pacer,
    allforyoung_base: Url,
    wevity_base: Url,
    max_pages_cap: u32,
}

impl CrawlSession {
    /// Builds the HTTP client and pacer from `config`
    pub fn new(config: &Config) -> Result<Self> {
        let allforyoung_base = parse_base(&config.sources.allforyoung_base)
            .map_err(|e| ConfigError::InvalidUrl(format!("allforyoung-base: {}", e)))?;
        let wevity_base = parse_base(&config.sources.wevity_base)
            .map_err(|e| ConfigError::InvalidUrl(format!("wevity-base: {}", e)))?;

        tracing::debug!(
            "Starting crawl session (timeout {}s, min interval {}ms)",
            config.fetch.timeout_secs,
            config.pacing.min_interval_ms
        );

        Ok(Self {
            client: FetchClient::new(&config.fetch)?,
            pacer: Pacer::from_config(&config.pacing),
            allforyoung_base,
            wevity_base,
            max_pages_cap: config.listing.max_pages_cap,
        })
    }

    /// Base origin configured for `source`
    pub fn base_url(&self, source: Source) -> &Url {
        match source {
            Source::AllForYoung => &self.allforyoung_base,
            Source::Wevity => &self.wevity_base,
        }
    }

    /// Crawls `max_pages` listing pages starting at `start_page`
    ///
    /// A page whose fetch fails contributes one [`ListingErrorMarker`] in its
    /// position and the loop moves on. Results are in page order, then
    /// document order within a page.
    pub async fn crawl_listing(
        &mut self,
        source: Source,
        start_page: u32,
        max_pages: u32,
    ) -> Vec<ListingEntry> {
        self.crawl_listing_run(source, start_page, max_pages)
            .await
            .entries
    }

    /// Like [`crawl_listing`](Self::crawl_listing), also reporting how many
    /// pages were walked after clamping the requested range
    pub async fn crawl_listing_run(
        &mut self,
        source: Source,
        start_page: u32,
        max_pages: u32,
    ) -> ListingRun {
        let (start_page, max_pages) = self.clamp_page_range(start_page, max_pages);
        let base = self.base_url(source).clone();
        let end_page = start_page.saturating_add(max_pages);

        tracing::info!(
            "Crawling {} listing pages {}..={}",
            source,
            start_page,
            end_page - 1
        );

        let mut entries = Vec::new();
        let mut seen_across_pages = HashSet::new();

        for page in start_page..end_page {
            let url = match listing_url(source, &base, page) {
                Ok(url) => url,
                Err(e) => {
                    entries.push(error_marker(page, e.to_string()));
                    continue;
                }
            };

            let html = match self.paced_fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Listing page {} failed: {}", page, e);
                    entries.push(error_marker(page, e.to_string()));
                    continue;
                }
            };

            let records = parse_listing(source, &html, &base);
            tracing::info!("Page {}: {} records", page, records.len());

            for record in records {
                // Cross-page repeats are reported but kept
                if !seen_across_pages.insert(record.id.clone()) {
                    tracing::debug!("Id {} seen again on page {}", record.id, page);
                }
                entries.push(ListingEntry::Record(record));
            }
        }

        ListingRun {
            entries,
            pages: max_pages,
        }
    }

    /// Listing crawl of the card-style site
    pub async fn crawl_listing_a(&mut self, start_page: u32, max_pages: u32) -> Vec<ListingEntry> {
        self.crawl_listing(Source::AllForYoung, start_page, max_pages)
            .await
    }

    /// Fetches and extracts one detail page
    ///
    /// Returns None when the id is not numeric or the page cannot be fetched;
    /// the reason is logged but not returned.
    pub async fn fetch_detail(&mut self, source: Source, id: &str) -> Option<DetailRecord> {
        let extractor = detail_extractor(source);
        let url = match extractor.detail_url(self.base_url(source), id) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Cannot build {} detail URL: {}", source, e);
                return None;
            }
        };

        let html = match self.paced_fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Detail {} {} unavailable: {}", source, id, e);
                return None;
            }
        };

        Some(extractor.extract_html(&html, id.trim(), &url))
    }

    /// Waits for the pacer, fetches, then starts the interval once the
    /// response (or failure) is in
    async fn paced_fetch(&mut self, url: &Url) -> std::result::Result<String, FetchError> {
        self.pacer.wait().await;
        let result = self.client.fetch(url.as_str()).await;
        self.pacer.finished(Instant::now());
        result
    }

    fn clamp_page_range(&self, start_page: u32, max_pages: u32) -> (u32, u32) {
        let start = if start_page == 0 {
            tracing::warn!("Start page 0 requested, starting at page 1");
            1
        } else {
            start_page
        };

        let pages = if max_pages == 0 {
            tracing::warn!("Zero pages requested, crawling 1");
            1
        } else if max_pages > self.max_pages_cap {
            tracing::warn!(
                "{} pages requested, limited to {}",
                max_pages,
                self.max_pages_cap
            );
            self.max_pages_cap
        } else {
            max_pages
        };

        (start, pages)
    }
}

fn error_marker(page: u32, error: String) -> ListingEntry {
    ListingEntry::Error(ListingErrorMarker { page, error })
}

/// One-shot detail fetch from the card-style site
pub async fn fetch_detail_a(config: &Config, id: &str) -> Result<Option<DetailRecord>> {
    let mut session = CrawlSession::new(config)?;
    Ok(session.fetch_detail(Source::AllForYoung, id).await)
}

/// One-shot detail fetch from the table-style site
pub async fn fetch_detail_b(config: &Config, id: &str) -> Result<Option<DetailRecord>> {
    let mut session = CrawlSession::new(config)?;
    Ok(session.fetch_detail(Source::Wevity, id).await)
}
