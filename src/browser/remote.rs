//! Remote rendering through a Browserless-compatible `/content` endpoint.

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use super::{BrowserProfile, NavigationPolicy, PageRenderer};
use crate::error::{ExtractError, Result};

pub struct RemoteRenderer {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    profile: BrowserProfile,
    policy: NavigationPolicy,
}

impl RemoteRenderer {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        profile: BrowserProfile,
        policy: NavigationPolicy,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(policy.dom_timeout + policy.network_idle_timeout)
            .build()?;

        info!(base_url, "Using remote browser renderer");
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            profile,
            policy,
        })
    }

    fn endpoint(&self) -> String {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }
        endpoint
    }

    /// The client timeout spans the whole exchange, body included.
    fn transport_error(&self, url: &str, e: reqwest::Error) -> ExtractError {
        if e.is_timeout() {
            ExtractError::NavigationTimeout {
                url: url.to_string(),
                timeout: self.policy.dom_timeout,
            }
        } else {
            ExtractError::from(e)
        }
    }

    fn request_body(&self, url: &str) -> serde_json::Value {
        json!({
            "url": url,
            "gotoOptions": {
                "waitUntil": "domcontentloaded",
                "timeout": self.policy.dom_timeout.as_millis() as u64,
            },
            "userAgent": self.profile.user_agent,
            "setExtraHTTPHeaders": {
                "Accept-Language": self.profile.accept_language,
            },
            "viewport": {
                "width": self.profile.viewport_width,
                "height": self.profile.viewport_height,
            },
        })
    }
}

#[async_trait]
impl PageRenderer for RemoteRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(url))
            .send()
            .await
            .map_err(|e| self.transport_error(url, e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            warn!(url, status = status.as_u16(), "Remote renderer rejected request");
            return Err(ExtractError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        resp.text().await.map_err(|e| self.transport_error(url, e))
    }

    fn name(&self) -> &str {
        "browserless"
    }
}
