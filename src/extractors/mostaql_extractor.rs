//! Mostaql project pages (Arabic)

use scraper::Html;

use super::css_extractor::{extract_all, extract_text};
use super::ExtractionResult;
use crate::platform::Platform;

const TITLE: &[&str] = &[
    "span[data-type='page-header-title']",
    ".heada__title h1",
    "h1.heada__title",
];

const DESCRIPTION: &[&str] = &[
    "#projectDetailsTab .text-wrapper-div",
    "#project-brief .text-wrapper-div",
    "#project-brief",
    ".project-post__body",
];

const BUDGET: &[&str] = &[
    "[data-type='project-budget_range']",
    "#project-meta-panel .meta-row-budget .meta-value",
    "#project-meta-panel tr:nth-child(3) td:nth-child(2)",
];

const SKILLS: &str = ".skills .tag bdi, .skills__item bdi, ul.skills li";

const TIMELINE: &[&str] = &[
    "[data-type='project-duration']",
    "#project-meta-panel .meta-row-duration .meta-value",
    "#project-meta-panel tr:nth-child(4) td:nth-child(2)",
];

const LOCATION: &[&str] = &[
    "[data-type='employer-country']",
    ".profile__meta .country",
];

pub fn extract_mostaql(document: &Html, url: &str) -> ExtractionResult {
    ExtractionResult {
        title: extract_text(document, TITLE),
        description: extract_text(document, DESCRIPTION),
        budget: extract_text(document, BUDGET),
        timeline: extract_text(document, TIMELINE),
        skills: extract_all(document, SKILLS),
        location: extract_text(document, LOCATION),
        ..ExtractionResult::new(Platform::Mostaql, url)
    }
}
