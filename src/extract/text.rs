//! DOM text helpers shared by the extractors

use regex::Regex;
use scraper::{ElementRef, Selector};

/// Concatenates every descendant text node, each trimmed, empty ones dropped
///
/// No separator is inserted, so `<p>주최 <b>A</b></p>` reads as `주최A`.
/// Length thresholds on the card-style site are tuned to this form.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// All descendant text with original spacing kept
pub fn full_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text of the element's direct text children only
pub fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|t| t.to_string()))
        .collect()
}

/// Descendant text joined by newlines, skipping subtrees of the named tags
pub fn text_excluding(element: ElementRef<'_>, skipped_tags: &[&str]) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let inside_skipped = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .filter_map(ElementRef::wrap)
            .any(|ancestor| skipped_tags.contains(&ancestor.value().name()));
        if !inside_skipped {
            parts.push(text.to_string());
        }
    }
    parts.join("\n")
}

/// Matches of `selector` strictly below `scope`
pub fn select_within<'a, 'b>(
    scope: ElementRef<'a>,
    selector: &'b Selector,
) -> impl Iterator<Item = ElementRef<'a>> + 'b
where
    'a: 'b,
{
    let scope_id = scope.id();
    scope
        .select(selector)
        .filter(move |element| element.id() != scope_id)
}

/// First descendant element (not `scope` itself) with a class token matching `pattern`
pub fn find_by_class<'a>(scope: ElementRef<'a>, pattern: &Regex) -> Option<ElementRef<'a>> {
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|element| has_class_matching(*element, pattern))
}

pub fn has_class_matching(element: ElementRef<'_>, pattern: &Regex) -> bool {
    element.value().classes().any(|class| pattern.is_match(class))
}

/// Closest ancestor element with the given tag name
pub fn closest_ancestor<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
}

/// The nearest element sibling before `element`, skipping text nodes
pub fn preceding_element<'a>(element: ElementRef<'a>) -> Option<ElementRef<'a>> {
    element.prev_siblings().find_map(ElementRef::wrap)
}
