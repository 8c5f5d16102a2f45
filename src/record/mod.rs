//! Canonical record shapes produced by the extractors
//!
//! Records are built fresh for every extraction call and never mutated
//! afterwards; persistence or rendering is the caller's business.

pub mod normalize;
mod source;

pub use normalize::{DEFAULT_CATEGORY, TITLE_PLACEHOLDER};
pub use source::Source;

use serde::{Deserialize, Serialize};

/// Summary of one contest card on a listing page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    /// Numeric identifier taken from the card's detail link
    pub id: String,
    pub title: String,
    /// Free-text deadline label, e.g. `D-12`
    pub d_day: String,
    /// Free-text organizer label
    pub host: String,
    /// Absolute detail URL
    pub url: String,
    pub category: String,
    pub source: Source,
}

/// Fields of a listing card as read from the page, before normalization
#[derive(Debug, Clone, Default)]
pub struct RawListing {
    pub id: String,
    pub title: String,
    pub d_day: String,
    pub host: String,
    pub url: String,
    pub category: Option<String>,
}

impl ListingRecord {
    /// Applies the placeholder title and the generic category default
    pub fn from_raw(source: Source, raw: RawListing) -> Self {
        let category = raw
            .category
            .as_deref()
            .map(|c| normalize::non_empty_or(c, DEFAULT_CATEGORY))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Self {
            id: raw.id,
            title: normalize::non_empty_or(&raw.title, TITLE_PLACEHOLDER),
            d_day: raw.d_day.trim().to_string(),
            host: raw.host.trim().to_string(),
            url: raw.url,
            category,
            source,
        }
    }
}

/// Stands in for a listing page whose fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingErrorMarker {
    pub page: u32,
    pub error: String,
}

/// One element of a listing crawl result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingEntry {
    Record(ListingRecord),
    Error(ListingErrorMarker),
}

impl ListingEntry {
    pub fn as_record(&self) -> Option<&ListingRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Splits crawl entries into records and error markers, preserving order
pub fn partition_entries(entries: &[ListingEntry]) -> (Vec<&ListingRecord>, Vec<&ListingErrorMarker>) {
    let mut records = Vec::new();
    let mut errors = Vec::new();
    for entry in entries {
        match entry {
            ListingEntry::Record(record) => records.push(record),
            ListingEntry::Error(marker) => errors.push(marker),
        }
    }
    (records, errors)
}

/// Full content of one contest detail page
///
/// Every field defaults to empty; a page that could not be fetched yields no
/// record at all rather than an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    pub host: String,
    pub category: String,
    pub apply_period: String,
    /// Plain text, paragraphs separated by blank lines
    pub body: String,
    pub apply_url: String,
    /// Absolute image URLs in first-seen order, without duplicates
    pub images: Vec<String>,
}

impl DetailRecord {
    pub fn empty(id: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }
}
