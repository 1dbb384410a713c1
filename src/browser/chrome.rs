//! Local Chromium over the DevTools protocol (`headless_chrome`).

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::protocol::cdp::Emulation;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, warn};

use super::{AbortSession, BrowserLauncher, BrowserProfile, PageSession};
use crate::error::{ExtractError, Result};

const RESOURCE_COUNT_JS: &str = "performance.getEntriesByType('resource').length";
/// `about:blank` still reports `complete` until the new document commits.
const READY_STATE_JS: &str =
    "location.href === 'about:blank' ? 'loading' : document.readyState";
const DOM_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Launches one Chromium process per session.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    /// Browser executable; `None` lets `headless_chrome` find one.
    chrome_path: Option<PathBuf>,
    sandbox: bool,
    /// How long the DevTools connection may stay silent before the browser is
    /// considered gone. Must outlast the slowest navigation.
    idle_timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(chrome_path: Option<PathBuf>, sandbox: bool, idle_timeout: Duration) -> Self {
        Self {
            chrome_path,
            sandbox,
            idle_timeout,
        }
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self, profile: &BrowserProfile) -> Result<ChromeSession> {
        let lang_arg = format!("--lang={}", primary_language(&profile.accept_language));
        let mut args = vec![OsStr::new(&lang_arg), OsStr::new("--disable-dev-shm-usage")];
        if profile.stealth {
            args.push(OsStr::new("--disable-blink-features=AutomationControlled"));
        }

        let options = LaunchOptions {
            headless: profile.headless,
            sandbox: self.sandbox,
            window_size: Some((profile.viewport_width, profile.viewport_height)),
            path: self.chrome_path.clone(),
            idle_browser_timeout: self.idle_timeout,
            args,
            ..Default::default()
        };

        let browser = Browser::new(options).map_err(|e| ExtractError::Launch(e.to_string()))?;

        // Incognito context: its own cookie jar and storage
        let tab = {
            let context = browser
                .new_context()
                .map_err(|e| ExtractError::Launch(e.to_string()))?;
            context
                .new_tab()
                .map_err(|e| ExtractError::Launch(e.to_string()))?
        };

        let mut session = ChromeSession {
            tab: Some(tab),
            browser: Some(browser),
            aborted: Arc::new(AtomicBool::new(false)),
        };
        if let Err(e) = session.apply_profile(profile) {
            session.close();
            return Err(e);
        }

        debug!(pid = ?session.process_id(), "Browser launched");
        Ok(session)
    }
}

/// A browser process with a single tab in an incognito context.
pub struct ChromeSession {
    tab: Option<Arc<Tab>>,
    browser: Option<Browser>,
    aborted: Arc<AtomicBool>,
}

impl ChromeSession {
    fn tab(&self) -> Option<&Arc<Tab>> {
        self.tab.as_ref()
    }

    fn process_id(&self) -> Option<u32> {
        self.browser.as_ref().and_then(|b| b.get_process_id())
    }

    fn apply_profile(&self, profile: &BrowserProfile) -> Result<()> {
        let Some(tab) = self.tab() else {
            return Err(ExtractError::Launch("session already closed".to_string()));
        };

        // Stealth mode installs its own user agent, so it goes first and ours
        // overrides it below
        if profile.stealth {
            if let Err(e) = tab.enable_stealth_mode() {
                warn!(error = %e, "Could not enable stealth mode");
            }
        }

        tab.set_user_agent(
            &profile.user_agent,
            Some(&profile.accept_language),
            Some(ua_platform(&profile.user_agent)),
        )
        .map_err(|e| ExtractError::Launch(format!("setting user agent: {e}")))?;

        if let Err(e) = tab.call_method(Emulation::SetTimezoneOverride {
            timezone_id: profile.timezone.clone(),
        }) {
            warn!(timezone = %profile.timezone, error = %e, "Could not override timezone");
        }

        Ok(())
    }
}

impl PageSession for ChromeSession {
    fn goto(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let Some(tab) = self.tab() else {
            return Err(ExtractError::Navigation {
                url: url.to_string(),
                message: "session already closed".to_string(),
            });
        };

        tab.set_default_timeout(timeout);
        let deadline = Instant::now() + timeout;
        let timed_out = || ExtractError::NavigationTimeout {
            url: url.to_string(),
            timeout,
        };

        if let Err(e) = tab.navigate_to(url) {
            if Instant::now() >= deadline {
                return Err(timed_out());
            }
            return Err(ExtractError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            });
        }

        // Only DOMContentLoaded is required here; subresources are left to the
        // network-idle wait
        loop {
            if self.aborted.load(Ordering::SeqCst) {
                return Err(ExtractError::Cancelled);
            }
            match tab.evaluate(READY_STATE_JS, false) {
                Ok(state) => {
                    let state = state.value.as_ref().and_then(|v| v.as_str()).unwrap_or("loading");
                    if state != "loading" {
                        return Ok(());
                    }
                }
                // The execution context is replaced while the new document commits
                Err(e) => debug!(url, error = %e, "readyState not readable yet"),
            }
            if Instant::now() >= deadline {
                return Err(timed_out());
            }
            std::thread::sleep(DOM_POLL_INTERVAL);
        }
    }

    fn resource_count(&mut self) -> Option<u64> {
        let result = self.tab()?.evaluate(RESOURCE_COUNT_JS, false).ok()?;
        result.value.and_then(|v| v.as_u64())
    }

    fn content(&mut self) -> Option<String> {
        match self.tab()?.get_content() {
            Ok(html) => Some(html),
            Err(e) => {
                warn!(error = %e, "Reading page content failed");
                None
            }
        }
    }

    fn close(&mut self) {
        if let Some(tab) = self.tab.take() {
            if let Err(e) = tab.close(false) {
                debug!(error = %e, "Tab close failed, browser shutdown will reap it");
            }
        }
        // Dropping the browser kills the process and its context
        if let Some(browser) = self.browser.take() {
            debug!(pid = ?browser.get_process_id(), "Closing browser");
            drop(browser);
        }
    }

    fn abort_handle(&self) -> Box<dyn AbortSession> {
        Box::new(ChromeAbort {
            tab: self.tab.clone(),
            aborted: Arc::clone(&self.aborted),
        })
    }
}

/// Stops a session from outside its worker by closing its tab, which fails
/// whatever DevTools call the worker is blocked on.
struct ChromeAbort {
    tab: Option<Arc<Tab>>,
    aborted: Arc<AtomicBool>,
}

impl AbortSession for ChromeAbort {
    fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
        let Some(tab) = self.tab.clone() else {
            return;
        };
        // Closing waits for a DevTools reply, so keep it off the caller's thread
        std::thread::spawn(move || {
            if let Err(e) = tab.close(false) {
                debug!(error = %e, "Aborting tab failed, worker will close the browser");
            }
        });
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// `en-US,en;q=0.9` -> `en-US`
fn primary_language(accept_language: &str) -> &str {
    accept_language
        .split([',', ';'])
        .next()
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .unwrap_or("en-US")
}

/// `navigator.platform` value consistent with the user agent.
fn ua_platform(user_agent: &str) -> &'static str {
    if user_agent.contains("Windows") {
        "Win32"
    } else if user_agent.contains("Mac OS X") {
        "MacIntel"
    } else {
        "Linux x86_64"
    }
}
