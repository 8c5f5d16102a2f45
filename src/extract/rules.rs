//! Ordered field-extraction rule tables
//!
//! Label-keyword scanning is expressed as a table of [`FieldRule`]s per page
//! template. Each rule pairs a predicate on a candidate's key text with a
//! target field and a transform of the candidate's value text. Evaluation
//! visits candidates in document order and applies every rule to each; the
//! last match for a field wins.

use crate::record::normalize::{char_len, collapse_whitespace, truncate_chars};
use regex::Regex;
use std::collections::HashMap;

/// Record fields filled by rule tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Host,
    Category,
    ApplyPeriod,
}

/// Predicate on a candidate's key text
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Every token must occur
    All(&'static [&'static str]),
    /// At least one token must occur
    Any(&'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::All(tokens) => tokens.iter().all(|t| text.contains(t)),
            Self::Any(tokens) => tokens.iter().any(|t| text.contains(t)),
        }
    }
}

/// Shaping applied to a matched candidate's value text
#[derive(Debug, Clone)]
pub enum Transform {
    /// Whitespace collapsed; an empty result does not count as a match
    Collapse,
    /// Pattern removed; falls back to the whole value when nothing remains
    StripPattern(Regex),
    /// Portion after the first occurrence of the token
    After(&'static str),
}

impl Transform {
    pub fn apply(&self, value: &str) -> Option<String> {
        match self {
            Self::Collapse => {
                let collapsed = collapse_whitespace(value);
                (!collapsed.is_empty()).then_some(collapsed)
            }
            Self::StripPattern(pattern) => {
                let stripped = pattern.replace_all(value, "");
                let stripped = stripped.trim();
                if stripped.is_empty() {
                    Some(value.trim().to_string())
                } else {
                    Some(stripped.to_string())
                }
            }
            Self::After(token) => value
                .split_once(token)
                .map(|(_, rest)| rest.trim().to_string()),
        }
    }
}

/// One row of a rule table
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Stable name, used in trace logs and tests
    pub name: &'static str,
    pub field: Field,
    pub matcher: Matcher,
    /// Key text must be strictly shorter than this many characters
    pub max_key_len: Option<usize>,
    pub transform: Transform,
    /// Result is truncated to this many characters
    pub cap: Option<usize>,
}

impl FieldRule {
    pub fn apply(&self, candidate: &Candidate) -> Option<String> {
        if let Some(max) = self.max_key_len {
            if char_len(&candidate.key) >= max {
                return None;
            }
        }

        if !self.matcher.matches(&candidate.key) {
            return None;
        }

        let value = self.transform.apply(&candidate.value)?;
        Some(match self.cap {
            Some(cap) => truncate_chars(&value, cap),
            None => value,
        })
    }
}

/// A piece of page text a rule can match against
///
/// For self-labelled text nodes key and value are the same string; for
/// label/value layouts the key is the label element's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub key: String,
    pub value: String,
}

impl Candidate {
    pub fn labelled(key: String, value: String) -> Self {
        Self { key, value }
    }

    pub fn self_labelled(text: String) -> Self {
        Self {
            key: text.clone(),
            value: text,
        }
    }
}

/// Field values produced by evaluating a rule table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues {
    values: HashMap<Field, String>,
}

impl FieldValues {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Value for `field`, or empty when no rule matched
    pub fn take(&mut self, field: Field) -> String {
        self.values.remove(&field).unwrap_or_default()
    }
}

/// Applies every rule to every candidate; the last match per field wins
pub fn evaluate<I>(rules: &[FieldRule], candidates: I) -> FieldValues
where
    I: IntoIterator<Item = Candidate>,
{
    let mut values = HashMap::new();
    for candidate in candidates {
        for rule in rules {
            if let Some(value) = rule.apply(&candidate) {
                tracing::trace!(rule = rule.name, value = %value, "rule matched");
                values.insert(rule.field, value);
            }
        }
    }
    FieldValues { values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_rule() -> FieldRule {
        FieldRule {
            name: "host",
            field: Field::Host,
            matcher: Matcher::All(&["주최", "주관"]),
            max_key_len: Some(20),
            transform: Transform::StripPattern(Regex::new(r"주최[/\s]*주관\s*").unwrap()),
            cap: None,
        }
    }

    #[test]
    fn test_matcher() {
        assert!(Matcher::All(&["a", "b"]).matches("xaybz"));
        assert!(!Matcher::All(&["a", "b"]).matches("xaz"));
        assert!(Matcher::Any(&["a", "b"]).matches("xbz"));
        assert!(!Matcher::Any(&["a", "b"]).matches("xyz"));
    }

    #[test]
    fn test_transforms() {
        assert_eq!(Transform::Collapse.apply(" a \n b "), Some("a b".to_string()));
        assert_eq!(Transform::Collapse.apply("  \n "), None);
        assert_eq!(
            Transform::After("접수기간").apply("접수기간 2025.01.01 ~ 01.31"),
            Some("2025.01.01 ~ 01.31".to_string())
        );
        assert_eq!(Transform::After("접수기간").apply("마감"), None);
    }

    #[test]
    fn test_strip_pattern_falls_back_to_whole_text() {
        let rule = host_rule();
        assert_eq!(
            rule.apply(&Candidate::self_labelled("주최/주관한국재단".to_string())),
            Some("한국재단".to_string())
        );
        assert_eq!(
            rule.apply(&Candidate::self_labelled("주최/주관".to_string())),
            Some("주최/주관".to_string())
        );
    }

    #[test]
    fn test_key_length_ceiling() {
        let rule = host_rule();
        let long = format!("주최/주관{}", "가".repeat(20));
        assert_eq!(rule.apply(&Candidate::self_labelled(long)), None);
    }

    #[test]
    fn test_cap_truncates_value() {
        let rule = FieldRule {
            name: "category",
            field: Field::Category,
            matcher: Matcher::Any(&["분야"]),
            max_key_len: None,
            transform: Transform::Collapse,
            cap: Some(3),
        };
        let candidate = Candidate::labelled("분야".to_string(), "디자인/영상".to_string());
        assert_eq!(rule.apply(&candidate), Some("디자인".to_string()));
    }

    #[test]
    fn test_evaluate_last_match_wins() {
        let rules = vec![host_rule()];
        let mut values = evaluate(
            &rules,
            vec![
                Candidate::self_labelled("주최/주관 첫째".to_string()),
                Candidate::self_labelled("관계없음".to_string()),
                Candidate::self_labelled("주최/주관 둘째".to_string()),
            ],
        );
        assert_eq!(values.get(Field::Host), Some("둘째"));
        assert_eq!(values.take(Field::Host), "둘째");
        assert_eq!(values.take(Field::Category), "");
    }

    #[test]
    fn test_evaluate_non_matching_value_does_not_overwrite() {
        let rules = vec![FieldRule {
            name: "category",
            field: Field::Category,
            matcher: Matcher::Any(&["분야"]),
            max_key_len: None,
            transform: Transform::Collapse,
            cap: None,
        }];
        let values = evaluate(
            &rules,
            vec![
                Candidate::labelled("분야".to_string(), "IT/기술".to_string()),
                Candidate::labelled("분야".to_string(), "   ".to_string()),
            ],
        );
        assert_eq!(values.get(Field::Category), Some("IT/기술"));
    }
}
