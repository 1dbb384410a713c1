//! Upwork job pages
//!
//! Candidates run newest layout first; the older `up-` / `job-details` class
//! names still show up on cached and A/B-tested variants.

use scraper::Html;

use super::css_extractor::{extract_all, extract_text, first_text};
use super::ExtractionResult;
use crate::platform::Platform;

const TITLE: &[&str] = &[
    "h1[data-test='job-title']",
    "[data-test='job-title']",
    "header h4.job-title",
    ".job-details-header h1",
];

const DESCRIPTION: &[&str] = &[
    "[data-test='Description']",
    "[data-test='job-description-text']",
    ".job-description .break",
    "section.up-card-section .job-description",
];

const FIXED_BUDGET: &[&str] = &[
    "[data-test='BudgetAmount'] strong",
    "[data-test='BudgetAmount']",
    "[data-test='job-budget']",
];

const HOURLY_RATE: &[&str] = &[
    "[data-test='HourlyRate'] strong",
    "[data-test='HourlyRate']",
    "[data-cy='clock-hourly'] + strong",
];

const SKILLS: &str = "[data-test='Skill'] .air3-token, .skills-list .air3-token, a.up-skill-badge";

const TIMELINE: &[&str] = &[
    "[data-test='Duration'] strong",
    "[data-test='Duration']",
    "[data-cy='duration2'] + strong",
];

const LOCATION: &[&str] = &[
    "[data-test='LocationLabel']",
    "[data-qa='client-location'] strong",
    "[data-test='client-location']",
];

pub fn extract_upwork(document: &Html, url: &str) -> ExtractionResult {
    // Fixed-price jobs show a budget; hourly jobs only show the rate range
    let budget = first_text(document, FIXED_BUDGET)
        .or_else(|| first_text(document, HOURLY_RATE))
        .unwrap_or_default();

    ExtractionResult {
        title: extract_text(document, TITLE),
        description: extract_text(document, DESCRIPTION),
        budget,
        timeline: extract_text(document, TIMELINE),
        skills: extract_all(document, SKILLS),
        location: extract_text(document, LOCATION),
        ..ExtractionResult::new(Platform::Upwork, url)
    }
}
