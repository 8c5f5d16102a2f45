//! Crawler module for listing and detail page fetching
//!
//! This module contains the network side of extraction, including:
//! - HTTP fetching with a fixed browser-like header profile
//! - Minimum-interval pacing between page fetches
//! - The crawl session that owns both for one run

mod fetcher;
mod pacer;
mod session;

pub use fetcher::{build_http_client, FetchClient, FetchError};
pub use pacer::Pacer;
pub use session::{fetch_detail_a, fetch_detail_b, CrawlSession, ListingRun};
