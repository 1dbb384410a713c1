//! Job posting extractor
//!
//! Loads a job posting in a headless browser and pulls out structured fields:
//! - Platform detection by hostname (Upwork, Freelancer, Mostaql, generic)
//! - Per-platform CSS selector cascades for title, description, budget,
//!   timeline, skills and location
//! - Page metadata enrichment (meta description/keywords, OpenGraph, title)
//! - Whole-page text fallback so the description is never empty when the
//!   page has text
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! use job_extractor::{init_logging, JobScraper, ScraperConfig};
//!
//! let config = ScraperConfig::from_env()?;
//! init_logging(&config.logging);
//! let scraper = JobScraper::from_config(&config)?;
//! let posting = scraper.scrape("https://www.upwork.com/jobs/~01abc").await?;
//! println!("{}: {}", posting.platform, posting.title);
//! # Ok(())
//! # }
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod extractors;
pub mod job_scraper;
pub mod logging;
pub mod platform;
pub mod text;

pub use browser::{
    AbortSession, BrowserLauncher, BrowserProfile, ChromeRenderer, NavigationPolicy, PageRenderer,
    PageSession, RemoteRenderer,
};
pub use config::{LoggingConfig, ScraperConfig};
pub use error::ExtractError;
pub use extractors::{extract_job_posting, ExtractionResult};
pub use job_scraper::JobScraper;
pub use logging::init_logging;
pub use platform::{detect_platform, Platform};
pub use text::normalize_whitespace;
