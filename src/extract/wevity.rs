//! Detail page extraction for the table-style site
//!
//! Contest metadata sits in label/value pairs (`th`/`td`, `dt`/`dd` or
//! `span`/`div.info`), so fields are classified by the label element that
//! precedes each value cell.

use super::listing::strip_tier_suffix;
use super::rules::{evaluate, Candidate, Field, FieldRule, Matcher, Transform};
use super::text::{
    full_text, has_class_matching, preceding_element, select_within, text_excluding,
};
use super::{push_unique, site_root, DetailExtractor};
use crate::record::normalize::{
    char_len, collapse_whitespace, join_paragraphs, tidy_multiline, truncate_chars,
    DEFAULT_CATEGORY,
};
use crate::record::{DetailRecord, Source};
use crate::url::{build_page_url, ensure_numeric_id, is_secure_absolute, resolve_href};
use crate::UrlResult;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter()
        .map(|css| Selector::parse(css).expect("valid selector"))
        .collect()
}

static TITLES: Lazy<Vec<Selector>> =
    Lazy::new(|| selectors(&["div.tit-area h6.tit", "h6.tit", "div.view-tit", "h1"]));
static CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selectors(&[
        "div.comm-desc",
        "div.contest-detail",
        "div.view-cont",
        "div.article-view",
    ])
});
static VALUE_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, div.info, dd").expect("valid selector"));
static SUB_TIT: Lazy<Selector> = Lazy::new(|| Selector::parse(".sub-tit").expect("valid selector"));
static FIELD_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"분야\s*:\s*(.+)").expect("valid regex"));
static IMG: Lazy<Selector> = Lazy::new(|| Selector::parse("img[src]").expect("valid selector"));
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));
static TEXT_BLOCK: Lazy<Selector> = Lazy::new(|| Selector::parse("p, div").expect("valid selector"));
static CONTENT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)content|desc|detail|view|text|body").expect("valid regex"));

/// Label/value rules for the contest info table
static INFO_RULES: Lazy<Vec<FieldRule>> = Lazy::new(|| {
    vec![
        labelled("host", Field::Host, &["주최", "주관"], 200),
        labelled("category", Field::Category, &["분야", "카테고리"], 200),
        labelled("apply_period", Field::ApplyPeriod, &["접수", "일정"], 300),
    ]
});

fn labelled(
    name: &'static str,
    field: Field,
    tokens: &'static [&'static str],
    cap: usize,
) -> FieldRule {
    FieldRule {
        name,
        field,
        matcher: Matcher::Any(tokens),
        max_key_len: Some(LABEL_MAX_LEN),
        transform: Transform::Collapse,
        cap: Some(cap),
    }
}

/// Labels are short captions; longer preceding text is content, not a label
const LABEL_MAX_LEN: usize = 40;
const SITE_MARKER: &str = "wevity.com";
const APPLY_KEYWORDS: [&str; 3] = ["지원", "신청", "참가"];
const BODY_MAX_CHARS: usize = 8000;
const FALLBACK_LIMIT: usize = 40;
const CATEGORY_CAP: usize = 200;

/// Detail pages at `/?c=find&s=1&gbn=view&ix={id}`
#[derive(Debug, Clone, Copy, Default)]
pub struct WevityDetail;

impl DetailExtractor for WevityDetail {
    fn source(&self) -> Source {
        Source::Wevity
    }

    fn detail_url(&self, base: &Url, id: &str) -> UrlResult<Url> {
        let id = ensure_numeric_id(id)?;
        build_page_url(base, &format!("/?c=find&s=1&gbn=view&ix={}", id))
    }

    fn extract(&self, document: &Html, id: &str, url: &Url) -> DetailRecord {
        let origin = site_root(url);
        let mut fields = evaluate(&INFO_RULES, info_candidates(document));

        let mut category = fields.take(Field::Category);
        if category.is_empty() {
            category =
                sub_title_category(document).unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        }

        let containers = content_containers(document);

        DetailRecord {
            id: id.to_string(),
            url: url.to_string(),
            title: extract_title(document),
            host: fields.take(Field::Host),
            category,
            apply_period: fields.take(Field::ApplyPeriod),
            body: extract_body(document, &containers),
            apply_url: extract_apply_url(document, &origin),
            images: extract_images(&containers, &origin),
        }
    }
}

fn extract_title(document: &Html) -> String {
    TITLES
        .iter()
        .filter_map(|selector| document.select(selector).next())
        .map(|el| collapse_whitespace(&full_text(el)))
        .find(|text| !text.is_empty())
        .map(|text| strip_tier_suffix(&text))
        .unwrap_or_default()
}

/// Each value cell paired with the text of the label element before it
fn info_candidates(document: &Html) -> Vec<Candidate> {
    document
        .select(&VALUE_CELL)
        .filter_map(|cell| {
            let label = preceding_element(cell)?;
            Some(Candidate::labelled(
                collapse_whitespace(&full_text(label)),
                collapse_whitespace(&full_text(cell)),
            ))
        })
        .collect()
}

fn sub_title_category(document: &Html) -> Option<String> {
    let text = full_text(document.select(&SUB_TIT).next()?);
    let category = FIELD_LABEL
        .captures(text.trim())
        .map(|caps| collapse_whitespace(&caps[1]))
        .unwrap_or_else(|| collapse_whitespace(&text));
    (!category.is_empty()).then(|| truncate_chars(&category, CATEGORY_CAP))
}

/// Elements matched by every container selector, in selector priority order
fn content_containers(document: &Html) -> Vec<Vec<ElementRef<'_>>> {
    CONTAINERS
        .iter()
        .map(|selector| document.select(selector).collect())
        .collect()
}

fn extract_body(document: &Html, containers: &[Vec<ElementRef<'_>>]) -> String {
    let primary = containers
        .iter()
        .find_map(|matched| matched.first())
        .map(|container| tidy_multiline(&text_excluding(*container, &["script", "style"])))
        .filter(|text| !text.is_empty());

    match primary {
        Some(text) => truncate_chars(&text, BODY_MAX_CHARS),
        None => fallback_body(document),
    }
}

fn fallback_body(document: &Html) -> String {
    let mut seen = HashSet::new();
    let blocks = document
        .select(&TEXT_BLOCK)
        .filter(|el| has_class_matching(*el, &CONTENT_CLASS))
        .map(|el| collapse_whitespace(&full_text(el)))
        .filter(|text| {
            let len = char_len(text);
            len > 30 && len < 3000 && !text.contains("AD") && !text.contains('©')
        })
        .filter(|text| seen.insert(text.clone()));
    join_paragraphs(blocks, FALLBACK_LIMIT)
}

fn extract_images(containers: &[Vec<ElementRef<'_>>], origin: &Url) -> Vec<String> {
    let mut images = Vec::new();
    for container in containers.iter().flatten() {
        let resolved = select_within(*container, &IMG)
            .filter_map(|img| img.value().attr("src"))
            .filter_map(|src| resolve_href(src, origin));
        for url in resolved {
            if url.contains(SITE_MARKER) || is_secure_absolute(&url) {
                push_unique(&mut images, url);
            }
        }
    }
    images
}

fn extract_apply_url(document: &Html, origin: &Url) -> String {
    document
        .select(&LINK)
        .filter(|a| {
            let text: String = a.text().collect();
            APPLY_KEYWORDS.iter().any(|keyword| text.contains(keyword))
        })
        .find_map(|a| a.value().attr("href").and_then(|href| resolve_href(href, origin)))
        .unwrap_or_default()
}
