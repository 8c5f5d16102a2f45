//! Storage module for persisting listing records
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Upserting listing records while keeping first-seen timestamps
//! - Crawl run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteListingStore;
pub use traits::{ListingStore, StorageError, StorageResult};

use crate::record::Source;
use std::path::Path;

/// Initializes or opens a storage database
pub fn open_storage(path: &Path) -> StorageResult<SqliteListingStore> {
    SqliteListingStore::new(path)
}

/// Counts from one upsert batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub inserted: usize,
    pub updated: usize,
}

/// A listing record as stored, with its bookkeeping timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredContest {
    pub source: Source,
    pub id: String,
    pub title: String,
    pub d_day: String,
    pub host: String,
    pub url: String,
    pub category: String,
    pub created_at: String,
    pub first_seen_at: String,
    pub updated_at: String,
}

/// Totals recorded when a crawl run finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlRunSummary {
    pub pages: u32,
    pub records: usize,
    pub errors: usize,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct CrawlRunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub source: Option<Source>,
    pub summary: CrawlRunSummary,
}
