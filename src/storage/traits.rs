//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::record::{ListingRecord, Source};
use crate::storage::{CrawlRunRecord, CrawlRunSummary, StoredContest, UpsertOutcome};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence of listing records and crawl bookkeeping
///
/// Records are keyed by `(source, id)`. Callers pass only successfully
/// extracted records; error markers never reach the store.
pub trait ListingStore {
    // ===== Listing Records =====

    /// Inserts new records and refreshes existing ones
    ///
    /// Existing rows keep their `created_at` and `first_seen_at`.
    fn upsert_listings(&mut self, records: &[ListingRecord]) -> StorageResult<UpsertOutcome>;

    /// Gets one stored record
    fn get_contest(&self, source: Source, id: &str) -> StorageResult<Option<StoredContest>>;

    /// Number of stored records per source, in source order
    fn count_by_source(&self) -> StorageResult<Vec<(Source, u64)>>;

    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str, source: Source) -> StorageResult<i64>;

    /// Marks a run finished with its totals
    fn complete_run(&mut self, run_id: i64, summary: &CrawlRunSummary) -> StorageResult<()>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<CrawlRunRecord>>;
}
