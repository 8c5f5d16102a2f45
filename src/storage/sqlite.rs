//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ListingStore trait.

use crate::record::{ListingRecord, Source};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ListingStore, StorageResult};
use crate::storage::{CrawlRunRecord, CrawlRunSummary, StoredContest, UpsertOutcome};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteListingStore {
    conn: Connection,
}

impl SqliteListingStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Upsert with an explicit timestamp for every touched row
    pub fn upsert_listings_at(
        &mut self,
        records: &[ListingRecord],
        now: DateTime<Utc>,
    ) -> StorageResult<UpsertOutcome> {
        let now = now.to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut outcome = UpsertOutcome::default();

        for record in records {
            let source = record.source.tag();
            let exists = tx
                .query_row(
                    "SELECT 1 FROM contests WHERE source = ?1 AND id = ?2",
                    params![source, record.id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            if exists {
                tx.execute(
                    "UPDATE contests
                     SET title = ?3, d_day = ?4, host = ?5, url = ?6, category = ?7, updated_at = ?8
                     WHERE source = ?1 AND id = ?2",
                    params![
                        source,
                        record.id,
                        record.title,
                        record.d_day,
                        record.host,
                        record.url,
                        record.category,
                        now
                    ],
                )?;
                outcome.updated += 1;
            } else {
                tx.execute(
                    "INSERT INTO contests
                     (source, id, title, d_day, host, url, category, created_at, first_seen_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?8)",
                    params![
                        source,
                        record.id,
                        record.title,
                        record.d_day,
                        record.host,
                        record.url,
                        record.category,
                        now
                    ],
                )?;
                outcome.inserted += 1;
            }
        }

        tx.commit()?;
        tracing::debug!(
            "Upserted {} records ({} new, {} updated)",
            records.len(),
            outcome.inserted,
            outcome.updated
        );
        Ok(outcome)
    }
}

fn contest_from_row(row: &Row<'_>) -> rusqlite::Result<StoredContest> {
    let source: String = row.get(0)?;
    let source = Source::from_tag(&source).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            format!("unknown source tag {:?}", source).into(),
        )
    })?;

    Ok(StoredContest {
        source,
        id: row.get(1)?,
        title: row.get(2)?,
        d_day: row.get(3)?,
        host: row.get(4)?,
        url: row.get(5)?,
        category: row.get(6)?,
        created_at: row.get(7)?,
        first_seen_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl ListingStore for SqliteListingStore {
    // ===== Listing Records =====

    fn upsert_listings(&mut self, records: &[ListingRecord]) -> StorageResult<UpsertOutcome> {
        self.upsert_listings_at(records, Utc::now())
    }

    fn get_contest(&self, source: Source, id: &str) -> StorageResult<Option<StoredContest>> {
        let contest = self
            .conn
            .query_row(
                "SELECT source, id, title, d_day, host, url, category, created_at, first_seen_at, updated_at
                 FROM contests WHERE source = ?1 AND id = ?2",
                params![source.tag(), id],
                contest_from_row,
            )
            .optional()?;
        Ok(contest)
    }

    fn count_by_source(&self) -> StorageResult<Vec<(Source, u64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM contests WHERE source = ?1")?;

        let mut counts = Vec::new();
        for source in Source::ALL {
            let count: i64 = stmt.query_row(params![source.tag()], |row| row.get(0))?;
            counts.push((source, count.max(0) as u64));
        }
        Ok(counts)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str, source: Source) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO crawl_runs (started_at, config_hash, source) VALUES (?1, ?2, ?3)",
            params![now, config_hash, source.tag()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, summary: &CrawlRunSummary) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE crawl_runs SET finished_at = ?1, pages = ?2, records = ?3, errors = ?4
             WHERE id = ?5",
            params![
                now,
                summary.pages,
                summary.records as i64,
                summary.errors as i64,
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(crate::storage::StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<CrawlRunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, source, pages, records, errors
                 FROM crawl_runs ORDER BY id DESC LIMIT 1",
                [],
                |row| {
                    Ok(CrawlRunRecord {
                        id: row.get(0)?,
                        started_at: row.get(1)?,
                        finished_at: row.get(2)?,
                        config_hash: row.get(3)?,
                        source: Source::from_tag(&row.get::<_, String>(4)?),
                        summary: CrawlRunSummary {
                            pages: row.get(5)?,
                            records: row.get::<_, i64>(6)?.max(0) as usize,
                            errors: row.get::<_, i64>(7)?.max(0) as usize,
                        },
                    })
                },
            )
            .optional()?;
        Ok(run)
    }
}
