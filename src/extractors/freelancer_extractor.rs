//! Freelancer.com project pages

use scraper::Html;

use super::css_extractor::{extract_all, extract_text};
use super::ExtractionResult;
use crate::platform::Platform;

const TITLE: &[&str] = &[
    ".PageProjectViewLogout-projectInfo-title",
    "h1[data-project-title]",
    ".PageProjectViewLogout-header-title",
    "h1.ProjectTitle",
];

const DESCRIPTION: &[&str] = &[
    ".PageProjectViewLogout-projectInfo-description",
    "[data-project-description]",
    ".ProjectDescription",
    ".project-description",
];

const BUDGET: &[&str] = &[
    ".PageProjectViewLogout-projectInfo-byLine",
    "[data-project-budget]",
    ".ProjectViewDetails-budget",
    ".project-budget",
];

const SKILLS: &str =
    ".PageProjectViewLogout-projectInfo-label-tags a, .ProjectViewDetailsSkills a, .project-skills a";

const TIMELINE: &[&str] = &[
    ".PageProjectViewLogout-projectInfo-label-deliveryInfo-relativeTime",
    ".PageProjectViewLogout-projectInfo-label-deliveryInfo",
    "[data-project-duration]",
];

const LOCATION: &[&str] = &[
    ".PageProjectViewLogout-detail-reputation-item-locationItem",
    "[data-employer-location]",
    ".employer-location",
];

pub fn extract_freelancer(document: &Html, url: &str) -> ExtractionResult {
    ExtractionResult {
        title: extract_text(document, TITLE),
        description: extract_text(document, DESCRIPTION),
        budget: extract_text(document, BUDGET),
        timeline: extract_text(document, TIMELINE),
        skills: extract_all(document, SKILLS),
        location: extract_text(document, LOCATION),
        ..ExtractionResult::new(Platform::Freelancer, url)
    }
}
