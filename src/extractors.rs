//! Job posting extraction pipeline
//!
//! Detect the platform from the URL, run that platform's ruleset (or the
//! generic fallback), enrich from page metadata, then make sure the
//! description is filled from the page text if the ruleset found nothing.

mod css_extractor;
mod freelancer_extractor;
mod generic_extractor;
mod metadata_extractor;
mod mostaql_extractor;
mod upwork_extractor;

pub use css_extractor::*;
pub use freelancer_extractor::*;
pub use generic_extractor::*;
pub use metadata_extractor::*;
pub use mostaql_extractor::*;
pub use upwork_extractor::*;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::platform::{detect_platform, Platform};
use crate::text::visible_text;

/// Structured job posting. Every field except `url` may be empty; a missing
/// field is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub platform: Platform,
    pub title: String,
    /// Non-empty whenever the page body has any visible text.
    pub description: String,
    /// Reserved; no ruleset parses requirements yet.
    pub requirements: Vec<String>,
    /// Free text as shown on the page, e.g. `$25-$50/hr`.
    pub budget: String,
    pub timeline: String,
    /// Document order, duplicates kept.
    pub skills: Vec<String>,
    /// Reserved; currency is classified from `budget` by the caller.
    pub currency: String,
    pub location: String,
    /// The input URL, unchanged.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_keywords: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_title: Option<String>,
}

impl ExtractionResult {
    /// Empty result for `url`, tagged with `platform`.
    pub fn new(platform: Platform, url: &str) -> Self {
        Self {
            platform,
            title: String::new(),
            description: String::new(),
            requirements: Vec::new(),
            budget: String::new(),
            timeline: String::new(),
            skills: Vec::new(),
            currency: String::new(),
            location: String::new(),
            url: url.to_string(),
            meta_description: None,
            meta_keywords: None,
            og_description: None,
            page_title: None,
        }
    }
}

/// Extract a job posting from rendered HTML.
pub fn extract_job_posting(html: &str, url: &str) -> ExtractionResult {
    let document = Html::parse_document(html);
    extract_from_document(&document, url)
}

/// Extract a job posting from an already parsed document.
pub fn extract_from_document(document: &Html, url: &str) -> ExtractionResult {
    let platform = detect_platform(url);
    let mut result = run_ruleset(platform, document, url);

    enrich_metadata(document, &mut result);

    if result.description.is_empty() {
        result.description = visible_text(document);
        debug!(
            url,
            %platform,
            found = !result.description.is_empty(),
            "Description filled from page text"
        );
    }

    result
}

/// Dispatch to the ruleset for `platform`.
pub fn run_ruleset(platform: Platform, document: &Html, url: &str) -> ExtractionResult {
    match platform {
        Platform::Upwork => extract_upwork(document, url),
        Platform::Freelancer => extract_freelancer(document, url),
        Platform::Mostaql => extract_mostaql(document, url),
        Platform::Generic => extract_generic(document, url),
    }
}
