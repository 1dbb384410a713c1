//! Fallback for unrecognized sites: the page title and its raw visible text.

use scraper::Html;

use super::ExtractionResult;
use crate::platform::Platform;
use crate::text::{document_title, visible_text};

pub fn extract_generic(document: &Html, url: &str) -> ExtractionResult {
    ExtractionResult {
        title: document_title(document),
        description: visible_text(document),
        ..ExtractionResult::new(Platform::Generic, url)
    }
}
