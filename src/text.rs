//! Text normalization and whole-page text

use scraper::{Html, Selector};

/// Elements whose text never renders as page content.
const NON_VISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "iframe"];

/// Collapse every whitespace run (newlines and tabs included) to one space and
/// trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of `<body>`, normalized. Empty when the page has no body text.
pub fn visible_text(document: &Html) -> String {
    let selector = match Selector::parse("body") {
        Ok(s) => s,
        Err(_) => return String::new(),
    };
    let body = match document.select(&selector).next() {
        Some(b) => b,
        None => return String::new(),
    };

    let mut parts: Vec<&str> = Vec::new();
    for node in body.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node.ancestors().any(|ancestor| {
            ancestor.value().as_element().is_some_and(|el| {
                NON_VISIBLE_TAGS.contains(&el.name()) || el.attr("hidden").is_some()
            })
        });
        if !hidden {
            parts.push(text);
        }
    }

    normalize_whitespace(&parts.join(" "))
}

/// The document `<title>`, normalized. Empty when missing.
pub fn document_title(document: &Html) -> String {
    let selector = match Selector::parse("title") {
        Ok(s) => s,
        Err(_) => return String::new(),
    };

    document
        .select(&selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Build\n\t a   website \n"), "Build a website");
        assert_eq!(normalize_whitespace("\n\t  "), "");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "already normalized",
            "  lots\n\nof \t\t space  ",
            "$25-$50/hr\u{00a0} Hourly",
            "مشروع   تصميم\nموقع",
            "",
        ];
        for s in samples {
            let once = normalize_whitespace(s);
            assert_eq!(normalize_whitespace(&once), once);
        }
    }

    #[test]
    fn test_visible_text_skips_scripts_and_hidden() {
        let html = r#"
        <html>
        <head><title>Job</title><style>body { color: red; }</style></head>
        <body>
            <script>window.__STATE__ = {"x": 1};</script>
            <p>We need a
               writer</p>
            <div hidden>Sign in to apply</div>
            <noscript>Enable JavaScript</noscript>
            <span>for a blog</span>
        </body>
        </html>
        "#;

        let document = Html::parse_document(html);
        assert_eq!(visible_text(&document), "We need a writer for a blog");
    }

    #[test]
    fn test_visible_text_empty_body() {
        let document = Html::parse_document("<html><head><title>t</title></head><body>  </body></html>");
        assert_eq!(visible_text(&document), "");
    }

    #[test]
    fn test_document_title() {
        let document =
            Html::parse_document("<html><head><title>\n  Example Job \n</title></head></html>");
        assert_eq!(document_title(&document), "Example Job");

        let untitled = Html::parse_document("<html><body><p>x</p></body></html>");
        assert_eq!(document_title(&untitled), "");
    }
}
