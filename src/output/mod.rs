//! Output module for emitting records and crawl statistics
//!
//! This module handles:
//! - Writing listing entries and detail records as JSON lines
//! - Summarizing crawl results and store contents

mod jsonl;
pub mod stats;

pub use jsonl::{write_json_line, write_json_lines};
pub use stats::{load_statistics, print_statistics, summarize_entries, StoreStatistics};
