//! Detail page extraction for the card-style site
//!
//! The page is a client-rendered article with few stable class names, so most
//! fields are found by keyword scanning over short text elements.

use super::rules::{evaluate, Candidate, Field, FieldRule, Matcher, Transform};
use super::text::{find_by_class, select_within, stripped_text};
use super::{push_unique, site_root, DetailExtractor};
use crate::record::normalize::{char_len, join_paragraphs};
use crate::record::{DetailRecord, Source};
use crate::url::{build_page_url, ensure_numeric_id, is_secure_absolute, resolve_root_relative};
use crate::UrlResult;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

static ROOTS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "body"]
        .iter()
        .map(|css| Selector::parse(css).expect("valid selector"))
        .collect()
});
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static PRELOAD_IMAGE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"link[rel="preload"][as="image"]"#).expect("valid selector")
});
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").expect("valid selector"));
static LABELLED_TEXT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, span, p").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static PROSE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)prose|markdown|content").expect("valid regex"));
static PROSE_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, h2, h3, h4, li").expect("valid selector"));
static LOOSE_BLOCK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p, h2, h3, h4, li, div").expect("valid selector"));

/// Host and application-period rules for the article body
static DETAIL_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        FieldRule {
            name: "host",
            field: Field::Host,
            matcher: Matcher::All(&["주최", "주관"]),
            max_key_len: Some(80),
            transform: Transform::StripPattern(
                Regex::new(r"주최[/\s]*주관\s*").expect("valid regex"),
            ),
            cap: None,
        },
        FieldRule {
            name: "apply_period",
            field: Field::ApplyPeriod,
            matcher: Matcher::Any(&["접수기간"]),
            max_key_len: Some(100),
            transform: Transform::After("접수기간"),
            cap: None,
        },
    ]
});

const CDN_MARKER: &str = "cdn.allforyoung";
const APPLY_KEYWORD: &str = "지원";
const PROSE_LIMIT: usize = 80;
const LOOSE_LIMIT: usize = 60;

/// Detail pages at `/posts/{id}`
#[derive(Debug, Clone, Copy, Default)]
pub struct AllForYoungDetail;

impl DetailExtractor for AllForYoungDetail {
    fn source(&self) -> Source {
        Source::AllForYoung
    }

    fn detail_url(&self, base: &Url, id: &str) -> UrlResult<Url> {
        let id = ensure_numeric_id(id)?;
        build_page_url(base, &format!("/posts/{}", id))
    }

    fn extract(&self, document: &Html, id: &str, url: &Url) -> DetailRecord {
        let origin = site_root(url);
        let root = content_root(document);
        let mut fields = evaluate(
            &DETAIL_RULES,
            select_within(root, &LABELLED_TEXT)
                .map(|el| Candidate::self_labelled(stripped_text(el))),
        );

        DetailRecord {
            id: id.to_string(),
            url: url.to_string(),
            title: document.select(&H1).next().map(stripped_text).unwrap_or_default(),
            host: fields.take(Field::Host),
            category: String::new(),
            apply_period: fields.take(Field::ApplyPeriod),
            body: extract_body(root),
            apply_url: extract_apply_url(root, &origin),
            images: extract_images(document, &origin),
        }
    }
}

fn content_root(document: &Html) -> ElementRef<'_> {
    ROOTS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .unwrap_or_else(|| document.root_element())
}

fn is_wanted_image(url: &str) -> bool {
    Url::parse(url).is_ok() && (url.contains(CDN_MARKER) || is_secure_absolute(url))
}

/// Preloaded hero images first, then inline images, in first-seen order
fn extract_images(document: &Html, origin: &Url) -> Vec<String> {
    let mut images = Vec::new();

    let preloaded = document
        .select(&PRELOAD_IMAGE)
        .filter_map(|link| link.value().attr("href"))
        .map(|href| resolve_root_relative(href, origin));
    let inline = document
        .select(&IMG)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(|src| resolve_root_relative(src, origin));

    for url in preloaded.chain(inline) {
        if !url.is_empty() && is_wanted_image(&url) {
            push_unique(&mut images, url);
        }
    }
    images
}

fn extract_apply_url(root: ElementRef<'_>, origin: &Url) -> String {
    select_within(root, &LINK)
        .find(|a| a.text().collect::<String>().contains(APPLY_KEYWORD))
        .and_then(|a| a.value().attr("href"))
        .map(|href| resolve_root_relative(href, origin))
        .unwrap_or_default()
}

fn extract_body(root: ElementRef<'_>) -> String {
    if let Some(prose) = find_by_class(root, &PROSE_CLASS) {
        let blocks = select_within(prose, &PROSE_BLOCK)
            .map(stripped_text)
            .filter(|text| !text.is_empty());
        return join_paragraphs(blocks, PROSE_LIMIT);
    }

    let blocks = select_within(root, &LOOSE_BLOCK)
        .map(stripped_text)
        .filter(|text| {
            let len = char_len(text);
            len > 20 && len < 1200 && !text.contains("AD") && !text.contains('©')
        });
    join_paragraphs(blocks, LOOSE_LIMIT)
}
