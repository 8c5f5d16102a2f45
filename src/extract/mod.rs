//! HTML extraction for listing and detail pages
//!
//! Each site's detail page template has its own [`DetailExtractor`]. Callers
//! pick one by [`Source`] and never branch on site markup themselves.

mod allforyoung;
pub mod listing;
pub mod rules;
pub mod text;
mod wevity;

pub use allforyoung::AllForYoungDetail;
pub use listing::{listing_url, parse_listing, strip_tier_suffix};
pub use wevity::WevityDetail;

use crate::record::{DetailRecord, Source};
use crate::UrlResult;
use scraper::Html;
use url::Url;

/// Extraction of one site's contest detail page
pub trait DetailExtractor: Send + Sync {
    fn source(&self) -> Source;

    /// Detail page URL for a numeric contest id
    fn detail_url(&self, base: &Url, id: &str) -> UrlResult<Url>;

    /// Builds a detail record from a parsed page
    ///
    /// Every field is best-effort: a rule that finds nothing leaves its field
    /// empty rather than failing the extraction.
    fn extract(&self, document: &Html, id: &str, url: &Url) -> DetailRecord;

    fn extract_html(&self, html: &str, id: &str, url: &Url) -> DetailRecord {
        let document = Html::parse_document(html);
        self.extract(&document, id, url)
    }
}

/// Extractor for the given site's detail pages
pub fn detail_extractor(source: Source) -> &'static dyn DetailExtractor {
    match source {
        Source::AllForYoung => &AllForYoungDetail,
        Source::Wevity => &WevityDetail,
    }
}

impl Source {
    pub fn detail_extractor(self) -> &'static dyn DetailExtractor {
        detail_extractor(self)
    }
}

/// Origin of a page URL, used to resolve `/`-rooted links
fn site_root(url: &Url) -> Url {
    url.join("/").unwrap_or_else(|_| url.clone())
}

/// Appends `url` unless it was already collected
fn push_unique(images: &mut Vec<String>, url: String) {
    if !images.contains(&url) {
        images.push(url);
    }
}
