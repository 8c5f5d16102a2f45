//! Listing page parsing
//!
//! Turns one fetched listing page into summary records. Both sites are
//! handled here since they share the per-page de-duplication and URL
//! resolution rules; only the card markup differs.

use crate::extract::text::{closest_ancestor, full_text, own_text, select_within, stripped_text};
use crate::record::normalize::{collapse_whitespace, truncate_chars};
use crate::record::{ListingRecord, RawListing, Source};
use crate::url::{build_page_url, resolve_href};
use crate::UrlResult;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

static POST_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/posts/"]"#).expect("valid selector"));
static POST_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/posts/(\d+)(?:\?|$)").expect("valid regex"));
static IMG_ALT: Lazy<Selector> = Lazy::new(|| Selector::parse("img[alt]").expect("valid selector"));
static BADGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-slot="badge"]"#).expect("valid selector"));
static CARD_FOOTER: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-slot="card-footer"]"#).expect("valid selector"));
static CARD_CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[data-slot="card-content"]"#).expect("valid selector"));

static LIST_ITEM: Lazy<Selector> =
    Lazy::new(|| Selector::parse("ul.list > li").expect("valid selector"));
static VIEW_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"div.tit a[href*="gbn=view"][href*="ix="]"#).expect("valid selector"));
static VIEW_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"ix=(\d+)").expect("valid regex"));
static SUB_TIT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.sub-tit").expect("valid selector"));
static ORGAN: Lazy<Selector> = Lazy::new(|| Selector::parse("div.organ").expect("valid selector"));
static DAY: Lazy<Selector> = Lazy::new(|| Selector::parse("div.day").expect("valid selector"));
static FIELD_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"분야\s*:\s*(.+)").expect("valid regex"));
static DEADLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"D-\d+|오늘\s*마감|마감").expect("valid regex"));
static SPECIAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+SPECIAL\s*$").expect("valid regex"));
static IDEA_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+IDEA\s*$").expect("valid regex"));

/// Category and title texts longer than this are cut
const LABEL_CAP: usize = 200;

/// URL of listing page `page` for the given site
pub fn listing_url(source: Source, base: &Url, page: u32) -> UrlResult<Url> {
    match source {
        Source::AllForYoung => build_page_url(base, &format!("/posts/contest?page={}", page)),
        Source::Wevity => build_page_url(base, &format!("/?c=find&s=1&gbn=list&gp={}", page)),
    }
}

/// Parses one listing page into records in document order
///
/// Records are de-duplicated by id within the page; the first card wins.
pub fn parse_listing(source: Source, html: &str, base: &Url) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);
    let raws = match source {
        Source::AllForYoung => parse_allforyoung_cards(&document, base),
        Source::Wevity => parse_wevity_rows(&document, base),
    };

    raws.into_iter()
        .map(|raw| ListingRecord::from_raw(source, raw))
        .collect()
}

/// Removes the promotion-tier badge text from a title
///
/// One trailing `SPECIAL` is stripped, then one trailing `IDEA`; nothing
/// else is repeated.
pub fn strip_tier_suffix(title: &str) -> String {
    let title = SPECIAL_SUFFIX.replace(title.trim(), "");
    let title = IDEA_SUFFIX.replace(&title, "");
    title.trim().to_string()
}

fn parse_allforyoung_cards(document: &Html, base: &Url) -> Vec<RawListing> {
    let mut seen = HashSet::new();
    let mut cards = Vec::new();

    for anchor in document.select(&POST_LINK) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(id) = POST_ID.captures(href).map(|c| c[1].to_string()) else {
            continue;
        };
        if seen.contains(&id) {
            continue;
        }

        // Header and pagination links to posts have no card around them
        let Some(card) = closest_ancestor(anchor, "li") else {
            tracing::trace!(href, "skipping post link outside a card");
            continue;
        };
        let Some(url) = resolve_href(href, base) else {
            tracing::trace!(href, "skipping card with unresolvable link");
            continue;
        };
        seen.insert(id.clone());

        let title = card
            .select(&IMG_ALT)
            .next()
            .and_then(|img| img.value().attr("alt"))
            .map(|alt| alt.trim().to_string())
            .unwrap_or_default();
        let d_day = first_text(card, &BADGE);
        let host = first_text(card, &CARD_FOOTER);
        let category = card
            .select(&CARD_CONTENT)
            .next()
            .and_then(|content| content.select(&BADGE).next())
            .map(stripped_text);

        cards.push(RawListing {
            id,
            title,
            d_day,
            host,
            url,
            category,
        });
    }

    cards
}

fn parse_wevity_rows(document: &Html, base: &Url) -> Vec<RawListing> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for row in document.select(&LIST_ITEM) {
        if row.value().classes().any(|class| class == "top") {
            continue;
        }
        let Some(anchor) = select_within(row, &VIEW_LINK).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(id) = VIEW_ID.captures(href).map(|c| c[1].to_string()) else {
            continue;
        };
        let Some(url) = resolve_href(href, base) else {
            tracing::trace!(href, "skipping row with unresolvable link");
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }

        let title = strip_tier_suffix(&collapse_whitespace(&own_text(anchor)));
        // The label match stops at the end of its line
        let category = select_within(row, &SUB_TIT)
            .next()
            .map(full_text)
            .and_then(|text| {
                FIELD_LABEL
                    .captures(text.trim())
                    .map(|c| truncate_chars(&collapse_whitespace(&c[1]), LABEL_CAP))
            })
            .filter(|category| !category.is_empty());
        let host = select_within(row, &ORGAN)
            .next()
            .map(|el| collapse_whitespace(&full_text(el)))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "-".to_string());
        let d_day = select_within(row, &DAY)
            .next()
            .map(|el| collapse_whitespace(&own_text(el)))
            .map(|text| {
                DEADLINE
                    .find(&text)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or(text)
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "-".to_string());

        rows.push(RawListing {
            id,
            title,
            d_day,
            host,
            url,
            category,
        });
    }

    rows
}

fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(stripped_text)
        .unwrap_or_default()
}
