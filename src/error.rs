use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failures that abort a scrape. Anything after the DOM has loaded degrades
/// to empty fields instead of surfacing here.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Browser failed to launch: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation to {url} timed out after {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("Remote renderer error (status {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Scrape cancelled")]
    Cancelled,

    #[error("Browser worker failed: {0}")]
    Worker(String),
}

impl ExtractError {
    /// True for the failures raised while loading the page itself.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            ExtractError::Navigation { .. } | ExtractError::NavigationTimeout { .. }
        )
    }
}

impl From<reqwest::Error> for ExtractError {
    fn from(err: reqwest::Error) -> Self {
        ExtractError::Network(err.to_string())
    }
}
