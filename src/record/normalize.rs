//! Shaping of raw extracted text into record field values

use once_cell::sync::Lazy;
use regex::Regex;

/// Title used when a listing card carries no usable title
pub const TITLE_PLACEHOLDER: &str = "(제목 없음)";

/// Category used when no category badge or label is found
pub const DEFAULT_CATEGORY: &str = "공모전";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Collapses every whitespace run to a single space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Keeps at most `max` characters (not bytes) of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Character length, which is what all extraction thresholds are measured in
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Trims `value`, substituting `fallback` when nothing is left
pub fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Trims each line and collapses runs of three or more newlines to two
pub fn tidy_multiline(text: &str) -> String {
    let trimmed_lines = text.lines().map(str::trim).collect::<Vec<_>>().join("\n");
    BLANK_RUNS
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

/// Joins text blocks as paragraphs, keeping at most `limit` of them
pub fn join_paragraphs<I>(blocks: I, limit: usize) -> String
where
    I: IntoIterator<Item = String>,
{
    blocks
        .into_iter()
        .take(limit)
        .collect::<Vec<_>>()
        .join("\n\n")
}
