//! CSS selector cascade
//!
//! Job boards change markup without notice and A/B test layouts, so every
//! field is read through an ordered list of candidate selectors. A candidate
//! that fails to parse, matches nothing, or yields only whitespace is skipped;
//! when every candidate misses the field is empty.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::text::normalize_whitespace;

/// Normalized text of the first element matched by the first candidate that
/// yields non-empty text.
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector_str| selector_text(document, selector_str))
}

/// Like [`first_text`] but empty when every candidate misses.
pub fn extract_text(document: &Html, selectors: &[&str]) -> String {
    first_text(document, selectors).unwrap_or_default()
}

/// Normalized texts of every element matched by `selector_str`, in document
/// order. Elements with no text are left out; duplicates are kept.
pub fn extract_all(document: &Html, selector_str: &str) -> Vec<String> {
    let selector = match parse_selector(selector_str) {
        Some(s) => s,
        None => return vec![],
    };

    document
        .select(&selector)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .collect()
}

fn selector_text(document: &Html, selector_str: &str) -> Option<String> {
    let selector = parse_selector(selector_str)?;
    let element = document.select(&selector).next()?;
    let text = element_text(&element);
    if text.is_empty() {
        debug!(selector = selector_str, "Selector matched an element without text");
        return None;
    }
    Some(text)
}

/// Text nodes are joined with spaces so adjacent block elements don't run
/// their words together.
fn element_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn parse_selector(selector_str: &str) -> Option<Selector> {
    match Selector::parse(selector_str) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!(selector = selector_str, error = %e, "Skipping unparsable selector");
            None
        }
    }
}
