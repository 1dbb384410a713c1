//! Platform detection by hostname

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Freelance job boards with a dedicated extraction ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Upwork,
    Freelancer,
    Mostaql,
    Generic,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upwork => "upwork",
            Self::Freelancer => "freelancer",
            Self::Mostaql => "mostaql",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hostname fragments in priority order. The first fragment contained in the
/// hostname decides the platform.
const HOST_FRAGMENTS: &[(&str, Platform)] = &[
    ("upwork.com", Platform::Upwork),
    ("freelancer.com", Platform::Freelancer),
    ("mostaql.com", Platform::Mostaql),
    ("mostaql.net", Platform::Mostaql),
    ("mostaqel.com", Platform::Mostaql),
];

/// Classify a URL by its hostname. URLs that don't parse or have no host are
/// `Generic`.
pub fn detect_platform(url: &str) -> Platform {
    let host = match Url::parse(url.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(h) => h.to_lowercase(),
            None => return Platform::Generic,
        },
        Err(_) => return Platform::Generic,
    };

    HOST_FRAGMENTS
        .iter()
        .find(|(fragment, _)| host.contains(fragment))
        .map(|(_, platform)| *platform)
        .unwrap_or(Platform::Generic)
}
