//! Page metadata enrichment
//!
//! Reads the standard description/keywords meta tags, `og:description` and
//! the document title, and attaches each one to the result only when the
//! primary ruleset left that key unset.

use scraper::{Html, Selector};
use tracing::debug;

use super::ExtractionResult;
use crate::text::{document_title, normalize_whitespace};

/// Where a metadata value lives in the page head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaSource {
    /// `<meta name="...">`
    Name(&'static str),
    /// `<meta property="...">`
    Property(&'static str),
}

/// Fill the enrichment keys that are still unset. Each tag is read on its own;
/// a missing or empty tag leaves its key unset without affecting the rest.
pub fn enrich_metadata(document: &Html, result: &mut ExtractionResult) {
    if result.meta_description.is_none() {
        result.meta_description = meta_content(document, MetaSource::Name("description"));
    }
    if result.meta_keywords.is_none() {
        result.meta_keywords = meta_content(document, MetaSource::Name("keywords"));
    }
    if result.og_description.is_none() {
        result.og_description = meta_content(document, MetaSource::Property("og:description"));
    }
    if result.page_title.is_none() {
        let title = document_title(document);
        if title.is_empty() {
            debug!("Page has no <title>");
        } else {
            result.page_title = Some(title);
        }
    }
}

/// Content of the first matching meta tag. Attribute names are compared
/// case-insensitively since pages use `Description`, `KEYWORDS`, etc.
fn meta_content(document: &Html, source: MetaSource) -> Option<String> {
    let selector = Selector::parse("meta").ok()?;

    let (attr, key) = match source {
        MetaSource::Name(key) => ("name", key),
        MetaSource::Property(key) => ("property", key),
    };

    let content = document
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr(attr)
                .is_some_and(|value| value.trim().eq_ignore_ascii_case(key))
        })
        .find_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .filter(|content| !content.is_empty());

    if content.is_none() {
        debug!(meta = key, "Metadata tag missing or empty");
    }
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    const HEAD: &str = r#"
    <html>
    <head>
        <title>Bar</title>
        <meta name="Description" content="Looking for a
            Rust developer">
        <meta name="keywords">
        <meta property="og:description" content="OG text">
    </head>
    <body><p>body</p></body>
    </html>
    "#;

    #[test]
    fn test_enrich_fills_unset_keys() {
        let document = Html::parse_document(HEAD);
        let mut result = ExtractionResult::new(Platform::Generic, "https://example.org");

        enrich_metadata(&document, &mut result);

        assert_eq!(
            result.meta_description.as_deref(),
            Some("Looking for a Rust developer")
        );
        // A keywords tag without content is skipped, not an error
        assert_eq!(result.meta_keywords, None);
        assert_eq!(result.og_description.as_deref(), Some("OG text"));
        assert_eq!(result.page_title.as_deref(), Some("Bar"));
    }

    #[test]
    fn test_enrich_never_overwrites() {
        let document = Html::parse_document(HEAD);
        let mut result = ExtractionResult::new(Platform::Upwork, "https://www.upwork.com/jobs/1");
        result.title = "Foo".to_string();
        result.description = "Primary description".to_string();
        result.meta_description = Some("set earlier".to_string());

        enrich_metadata(&document, &mut result);

        assert_eq!(result.title, "Foo");
        assert_eq!(result.description, "Primary description");
        assert_eq!(result.meta_description.as_deref(), Some("set earlier"));
        assert_eq!(result.page_title.as_deref(), Some("Bar"));
    }

    #[test]
    fn test_enrich_without_head() {
        let document = Html::parse_document("<p>just text</p>");
        let mut result = ExtractionResult::new(Platform::Generic, "https://example.org");

        enrich_metadata(&document, &mut result);

        assert_eq!(result.meta_description, None);
        assert_eq!(result.meta_keywords, None);
        assert_eq!(result.og_description, None);
        assert_eq!(result.page_title, None);
    }
}
