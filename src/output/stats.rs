//! Statistics generation from the listing database
//!
//! This module provides functionality for extracting and displaying
//! store statistics and per-run crawl totals.

use crate::record::{ListingEntry, Source};
use crate::storage::{CrawlRunRecord, CrawlRunSummary, ListingStore};
use crate::Result;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Stored records per source
    pub records_by_source: Vec<(Source, u64)>,

    /// Most recent crawl run, if any
    pub latest_run: Option<CrawlRunRecord>,
}

impl StoreStatistics {
    pub fn total_records(&self) -> u64 {
        self.records_by_source.iter().map(|(_, count)| count).sum()
    }
}

/// Loads statistics from storage
pub fn load_statistics(store: &dyn ListingStore) -> Result<StoreStatistics> {
    Ok(StoreStatistics {
        records_by_source: store.count_by_source()?,
        latest_run: store.get_latest_run()?,
    })
}

/// Totals of one listing crawl's output
pub fn summarize_entries(entries: &[ListingEntry], pages: u32) -> CrawlRunSummary {
    let errors = entries.iter().filter(|entry| entry.is_error()).count();
    CrawlRunSummary {
        pages,
        records: entries.len() - errors,
        errors,
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    println!("=== Listing Store Statistics ===\n");

    println!("Records by Source:");
    for (source, count) in &stats.records_by_source {
        println!("  {} ({}): {}", source, source.slug(), count);
    }
    println!("  Total: {}", stats.total_records());
    println!();

    match &stats.latest_run {
        Some(run) => {
            println!("Latest Run:");
            println!("  ID: {}", run.id);
            if let Some(source) = run.source {
                println!("  Source: {}", source);
            }
            println!("  Started: {}", run.started_at);
            println!(
                "  Finished: {}",
                run.finished_at.as_deref().unwrap_or("(not finished)")
            );
            println!("  Config hash: {}", run.config_hash);
            println!(
                "  Pages: {}, records: {}, failed pages: {}",
                run.summary.pages, run.summary.records, run.summary.errors
            );
        }
        None => println!("No crawl runs recorded."),
    }
}
