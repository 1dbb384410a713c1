//! URL in, structured job posting out.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use url::Url;

use crate::browser::{renderer_from_config, PageRenderer};
use crate::config::ScraperConfig;
use crate::error::{ExtractError, Result};
use crate::extractors::{extract_job_posting, ExtractionResult};

/// Scrapes job postings. Holds no per-request state, so one instance can
/// serve concurrent requests; each render gets its own browser.
#[derive(Clone)]
pub struct JobScraper {
    renderer: Arc<dyn PageRenderer>,
}

impl JobScraper {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer }
    }

    pub fn from_config(config: &ScraperConfig) -> Result<Self> {
        Ok(Self::new(renderer_from_config(config)?))
    }

    pub fn renderer_name(&self) -> &str {
        self.renderer.name()
    }

    /// Render `url` and extract the posting. Fails only when the page can't
    /// be loaded; missing fields come back empty.
    pub async fn scrape(&self, url: &str) -> Result<ExtractionResult> {
        validate_url(url)?;

        let started = Instant::now();
        info!(url, renderer = self.renderer.name(), "Scraping job posting");

        let html = match self.renderer.render(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "Rendering failed");
                return Err(e);
            }
        };

        let result = extract_job_posting(&html, url);
        info!(
            url,
            platform = %result.platform,
            title_found = !result.title.is_empty(),
            description_len = result.description.len(),
            skills = result.skills.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scraped job posting"
        );
        Ok(result)
    }

    /// Like [`scrape`](Self::scrape), but gives up with
    /// [`ExtractError::Cancelled`] as soon as `cancelled` completes. The
    /// in-flight render is dropped, which tears its browser down.
    pub async fn scrape_until<F>(&self, url: &str, cancelled: F) -> Result<ExtractionResult>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.scrape(url) => result,
            _ = cancelled => {
                info!(url, "Scrape cancelled by caller");
                Err(ExtractError::Cancelled)
            }
        }
    }
}

/// Only absolute http(s) URLs are worth launching a browser for.
fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url).map_err(|e| ExtractError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ExtractError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none() {
        return Err(ExtractError::InvalidUrl {
            url: url.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{fast_policy, FakeLauncher, Navigation};
    use crate::browser::{BrowserProfile, ChromeRenderer};
    use crate::platform::Platform;
    use std::time::Duration;

    fn scraper_for(launcher: FakeLauncher) -> JobScraper {
        JobScraper::new(Arc::new(ChromeRenderer::new(
            launcher,
            BrowserProfile::default(),
            fast_policy(),
        )))
    }

    #[tokio::test]
    async fn test_upwork_end_to_end_description_includes_heading() {
        let launcher = FakeLauncher::new(
            r#"<html><head><title>Upwork</title></head>
            <body><h1 data-test="job-title">Build a website</h1><p>Full job text here</p></body></html>"#,
        );
        let counters = Arc::clone(&launcher.counters);
        let scraper = scraper_for(launcher);

        let result = scraper.scrape("https://www.upwork.com/jobs/example").await.unwrap();

        assert_eq!(result.platform, Platform::Upwork);
        assert_eq!(result.title, "Build a website");
        // Whole-body fallback: heading plus paragraph, not the paragraph alone
        assert_eq!(result.description, "Build a website Full job text here");
        assert_eq!(counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_generic_end_to_end() {
        let launcher = FakeLauncher::new(
            "<html><head><title>Example Job</title></head><body>We need a writer</body></html>",
        );
        let scraper = scraper_for(launcher);

        let result = scraper.scrape("https://example.org/job/1").await.unwrap();

        assert_eq!(result.platform, Platform::Generic);
        assert_eq!(result.title, "Example Job");
        assert_eq!(result.description, "We need a writer");
    }

    #[tokio::test]
    async fn test_navigation_timeout_returns_error_and_releases_browser() {
        let mut launcher = FakeLauncher::new("<html></html>");
        launcher.navigation = Navigation::TimesOut;
        let counters = Arc::clone(&launcher.counters);
        let scraper = scraper_for(launcher);

        let err = scraper.scrape("https://www.upwork.com/jobs/slow").await.unwrap_err();

        assert!(matches!(err, ExtractError::NavigationTimeout { .. }));
        assert_eq!(counters.launched(), 1);
        assert_eq!(counters.closed(), 1);
    }

    #[tokio::test]
    async fn test_invalid_url_never_launches() {
        let launcher = FakeLauncher::new("<html></html>");
        let counters = Arc::clone(&launcher.counters);
        let scraper = scraper_for(launcher);

        for url in ["not a url", "ftp://example.org/file", "file:///etc/passwd"] {
            let err = scraper.scrape(url).await.unwrap_err();
            assert!(matches!(err, ExtractError::InvalidUrl { .. }), "url: {url}");
        }
        assert_eq!(counters.launched(), 0);
    }

    #[tokio::test]
    async fn test_cancel_tears_down_browser_mid_navigation() {
        let mut launcher = FakeLauncher::new("<html><body>late</body></html>");
        launcher.navigation = Navigation::Hangs(Duration::from_secs(3));
        let counters = Arc::clone(&launcher.counters);
        let scraper = scraper_for(launcher);

        let started = Instant::now();
        let err = scraper
            .scrape_until(
                "https://www.freelancer.com/projects/1",
                tokio::time::sleep(Duration::from_millis(50)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Cancelled));

        // Cancelling aborts the navigation, so the browser closes long
        // before the page would have finished loading
        let deadline = Instant::now() + Duration::from_secs(5);
        while counters.closed() == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(counters.launched(), 1);
        assert_eq!(counters.aborted(), 1);
        assert_eq!(counters.closed(), 1);
        assert_eq!(counters.snapshots(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_scrapes_get_their_own_browser() {
        let launcher = FakeLauncher::new("<html><body>job</body></html>");
        let counters = Arc::clone(&launcher.counters);
        let scraper = scraper_for(launcher);

        let (a, b) = tokio::join!(
            scraper.scrape("https://example.org/a"),
            scraper.scrape("https://example.org/b")
        );

        assert_eq!(a.unwrap().url, "https://example.org/a");
        assert_eq!(b.unwrap().url, "https://example.org/b");
        assert_eq!(counters.launched(), 2);
        assert_eq!(counters.closed(), 2);
    }

    #[test]
    fn test_from_config_picks_remote_backend() {
        let config = ScraperConfig {
            browserless_url: Some("http://browserless:3000".to_string()),
            ..ScraperConfig::default()
        };
        let scraper = JobScraper::from_config(&config).unwrap();
        assert_eq!(scraper.renderer_name(), "browserless");
    }
}
