//! Page rendering
//!
//! A [`PageRenderer`] turns a URL into the HTML of the rendered page. The local
//! backend drives one headless browser per call through the blocking
//! [`BrowserLauncher`] / [`PageSession`] pair on a worker thread; the remote
//! backend asks a Browserless-compatible service for the same thing.
//!
//! Navigation policy: the DOM must load within `dom_timeout` or the render
//! fails. After that everything is best-effort. Waiting for network idle may
//! time out silently, and a failed HTML snapshot degrades to an empty page.

mod chrome;
mod remote;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use remote::RemoteRenderer;

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;
use crate::error::{ExtractError, Result};

/// The network counts as idle once the resource count is stable this long.
const NETWORK_QUIET_WINDOW: Duration = Duration::from_millis(500);
const NETWORK_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Slack on top of the navigation ceilings before the worker is abandoned.
const DEFAULT_WORKER_GRACE: Duration = Duration::from_secs(10);

#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Load `url` and return the rendered DOM as HTML.
    async fn render(&self, url: &str) -> Result<String>;
    fn name(&self) -> &str;
}

/// Identity presented by each browsing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub accept_language: String,
    pub timezone: String,
    pub headless: bool,
    /// Apply anti-bot-detection countermeasures.
    pub stealth: bool,
}

impl BrowserProfile {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            accept_language: config.accept_language.clone(),
            timezone: config.timezone.clone(),
            headless: config.headless,
            stealth: config.stealth,
        }
    }
}

impl Default for BrowserProfile {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationPolicy {
    /// Hard ceiling for the DOM to load.
    pub dom_timeout: Duration,
    /// Soft ceiling for the network to go quiet afterwards.
    pub network_idle_timeout: Duration,
    /// Extra time the blocking worker gets before it is abandoned.
    pub worker_grace: Duration,
}

impl NavigationPolicy {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            dom_timeout: Duration::from_secs(config.navigation_timeout_secs),
            network_idle_timeout: Duration::from_secs(config.network_idle_timeout_secs),
            worker_grace: DEFAULT_WORKER_GRACE,
        }
    }

    /// Longest a whole render may take before it is treated as hung.
    pub fn ceiling(&self) -> Duration {
        self.dom_timeout + self.network_idle_timeout + self.worker_grace
    }
}

impl Default for NavigationPolicy {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

/// Starts a dedicated browser with a fresh, isolated context.
pub trait BrowserLauncher: Send + Sync + 'static {
    type Session: PageSession;

    fn launch(&self, profile: &BrowserProfile) -> Result<Self::Session>;
}

/// One open page in its own browser context. Calls block.
pub trait PageSession {
    /// Navigate and wait for the DOM to load.
    fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Number of network resources the page has requested so far, if readable.
    fn resource_count(&mut self) -> Option<u64>;

    /// Snapshot of the current DOM, if readable.
    fn content(&mut self) -> Option<String>;

    /// Release the context and browser. Must be safe to call more than once.
    fn close(&mut self);

    /// Handle that interrupts this session from another thread.
    fn abort_handle(&self) -> Box<dyn AbortSession>;
}

/// Interrupts whatever a [`PageSession`] is blocked on, so the worker owning
/// it returns promptly and closes it.
pub trait AbortSession: Send + Sync {
    fn abort(&self);
}

/// Cancellation signal shared between an async caller and a blocking worker.
/// Cancelling also aborts the session the worker has registered, so a
/// navigation in progress does not run to its ceiling.
#[derive(Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    session: Arc<Mutex<Option<Box<dyn AbortSession>>>>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let handle = match self.session.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Attach the live session. Aborts it at once if cancellation already
    /// happened.
    fn register(&self, handle: Box<dyn AbortSession>) {
        let mut slot = match self.session.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if self.is_cancelled() {
            drop(slot);
            handle.abort();
        } else {
            *slot = Some(handle);
        }
    }

    /// Detach the session once the worker is done with it.
    fn clear(&self) {
        match self.session.lock() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ExtractError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Guard that raises the flag when dropped.
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

pub struct CancelOnDrop(CancelFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Closes the session on every exit path.
struct SessionGuard<S: PageSession> {
    session: S,
    cancel: CancelFlag,
}

impl<S: PageSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: PageSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: PageSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.cancel.clear();
        self.session.close();
    }
}

/// Launch, navigate, wait, snapshot. The session is closed before returning,
/// whichever way this returns.
pub fn render_blocking<L: BrowserLauncher>(
    launcher: &L,
    profile: &BrowserProfile,
    policy: &NavigationPolicy,
    url: &str,
    cancel: &CancelFlag,
) -> Result<String> {
    cancel.check()?;
    let mut session = SessionGuard {
        session: launcher.launch(profile)?,
        cancel: cancel.clone(),
    };
    cancel.register(session.abort_handle());

    cancel.check()?;
    let started = Instant::now();
    if let Err(e) = session.goto(url, policy.dom_timeout) {
        // An aborted navigation fails with whatever the browser reports
        cancel.check()?;
        return Err(e);
    }
    debug!(url, elapsed_ms = started.elapsed().as_millis() as u64, "DOM loaded");

    cancel.check()?;
    if !wait_for_network_idle(&mut *session, policy.network_idle_timeout, cancel) {
        warn!(
            url,
            timeout_secs = policy.network_idle_timeout.as_secs(),
            "Network did not go idle, continuing"
        );
    }

    cancel.check()?;
    let html = session.content().unwrap_or_else(|| {
        warn!(url, "Could not read page content, continuing with empty page");
        String::new()
    });

    Ok(html)
}

/// Poll the page's resource count until it holds still for
/// [`NETWORK_QUIET_WINDOW`]. Returns false on timeout or cancellation.
fn wait_for_network_idle<S: PageSession + ?Sized>(
    session: &mut S,
    timeout: Duration,
    cancel: &CancelFlag,
) -> bool {
    let deadline = Instant::now() + timeout;
    let mut last = session.resource_count();
    let mut quiet_since = Instant::now();

    loop {
        if cancel.is_cancelled() {
            return false;
        }
        if quiet_since.elapsed() >= NETWORK_QUIET_WINDOW {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }

        std::thread::sleep(NETWORK_POLL_INTERVAL);

        let current = session.resource_count();
        if current != last {
            last = current;
            quiet_since = Instant::now();
        }
    }
}

/// Local headless browser, one process per render.
pub struct ChromeRenderer<L: BrowserLauncher = ChromeLauncher> {
    launcher: Arc<L>,
    profile: Arc<BrowserProfile>,
    policy: NavigationPolicy,
}

impl ChromeRenderer<ChromeLauncher> {
    pub fn from_config(config: &ScraperConfig) -> Self {
        let policy = NavigationPolicy::from_config(config);
        let launcher = ChromeLauncher::new(config.chrome_path.clone(), config.sandbox, policy.ceiling());
        Self::new(launcher, BrowserProfile::from_config(config), policy)
    }
}

impl<L: BrowserLauncher> ChromeRenderer<L> {
    pub fn new(launcher: L, profile: BrowserProfile, policy: NavigationPolicy) -> Self {
        info!(
            headless = profile.headless,
            stealth = profile.stealth,
            dom_timeout_secs = policy.dom_timeout.as_secs(),
            "Using local headless browser renderer"
        );
        Self {
            launcher: Arc::new(launcher),
            profile: Arc::new(profile),
            policy,
        }
    }
}

#[async_trait]
impl<L: BrowserLauncher> PageRenderer for ChromeRenderer<L> {
    async fn render(&self, url: &str) -> Result<String> {
        let cancel = CancelFlag::new();
        // Dropping this future (caller timeout, cancellation) aborts the
        // worker's session, and the worker then closes the browser.
        let _cancel_on_drop = cancel.cancel_on_drop();

        let launcher = Arc::clone(&self.launcher);
        let profile = Arc::clone(&self.profile);
        let policy = self.policy;
        let target = url.to_string();
        let worker_cancel = cancel.clone();

        let worker = tokio::task::spawn_blocking(move || {
            render_blocking(&*launcher, &profile, &policy, &target, &worker_cancel)
        });

        match tokio::time::timeout(self.policy.ceiling(), worker).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => Err(ExtractError::Worker(e.to_string())),
            Err(_) => {
                warn!(url, "Browser worker exceeded its ceiling, abandoning it");
                Err(ExtractError::NavigationTimeout {
                    url: url.to_string(),
                    timeout: self.policy.dom_timeout,
                })
            }
        }
    }

    fn name(&self) -> &str {
        "chrome"
    }
}

/// Pick the backend the config asks for: remote when a Browserless URL is
/// set, local Chromium otherwise.
pub fn renderer_from_config(config: &ScraperConfig) -> Result<Arc<dyn PageRenderer>> {
    match config.browserless_url.as_deref() {
        Some(base_url) => {
            let renderer = RemoteRenderer::new(
                base_url,
                config.browserless_token.as_deref(),
                BrowserProfile::from_config(config),
                NavigationPolicy::from_config(config),
            )?;
            Ok(Arc::new(renderer))
        }
        None => Ok(Arc::new(ChromeRenderer::from_config(config))),
    }
}
