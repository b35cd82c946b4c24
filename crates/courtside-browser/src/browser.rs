//! Browser lifecycle and page automation using Chrome DevTools Protocol

use crate::error::{CourtsideError, Result};
use crate::frame;
use async_trait::async_trait;
use courtside_core::config::BrowserSettings;
use courtside_core::{FrameRef, Locator, PageAutomation};
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Chrome flags carried over from the booking site's known-good setup.
/// Site isolation is disabled so cross-origin payment frames stay in
/// process and their documents show up in a pierced DOM snapshot.
const EXTRA_ARGS: [&str; 3] = [
    "--disable-gpu",
    "--allow-running-insecure-content",
    "--disable-features=IsolateOrigins,site-per-process",
];

/// How often frame-scoped lookups re-query while waiting
const FRAME_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for browser launch
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true)
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// User agent string
    pub user_agent: Option<String>,
    /// How long element lookups wait before giving up, in seconds
    pub timeout_seconds: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self::from(&BrowserSettings::default())
    }
}

impl From<&BrowserSettings> for BrowserConfig {
    fn from(settings: &BrowserSettings) -> Self {
        Self {
            headless: settings.headless,
            window_width: settings.window_width,
            window_height: settings.window_height,
            user_agent: settings.user_agent.clone(),
            timeout_seconds: settings.element_timeout_seconds,
        }
    }
}

/// Active browser session with Chrome DevTools Protocol
pub struct BrowserSession {
    /// Underlying browser instance (kept alive for tab lifetime)
    #[allow(dead_code)]
    browser: Browser,
    /// Current active tab
    tab: Arc<Tab>,
    /// Configuration
    config: BrowserConfig,
    /// Frame element operations are scoped to; None is the top document
    frame: Mutex<Option<FrameRef>>,
}

impl BrowserSession {
    /// Launch a new browser instance with default settings
    pub async fn launch() -> Result<Self> {
        Self::launch_with_config(BrowserConfig::default()).await
    }

    /// Launch browser with custom configuration
    pub async fn launch_with_config(config: BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let mut launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some((config.window_width, config.window_height)))
            .build()
            .map_err(|e| CourtsideError::Browser(format!("Failed to launch browser: {}", e)))?;

        let user_agent_arg: Option<String> = config
            .user_agent
            .as_ref()
            .map(|ua| format!("--user-agent={}", ua));
        if let Some(ref ua_arg) = user_agent_arg {
            launch_options.args.push(OsStr::new(ua_arg));
        }
        for arg in EXTRA_ARGS {
            launch_options.args.push(OsStr::new(arg));
        }

        let browser = Browser::new(launch_options)
            .map_err(|e| CourtsideError::Browser(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| CourtsideError::Browser(format!("Failed to create tab: {}", e)))?;

        info!("Browser launched successfully");

        Ok(Self {
            browser,
            tab,
            config,
            frame: Mutex::new(None),
        })
    }

    /// Get reference to the active tab
    pub fn tab(&self) -> &Arc<Tab> {
        &self.tab
    }

    /// Close the browser session
    pub async fn close(self) -> Result<()> {
        info!("Closing browser session");
        Ok(())
    }

    fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_seconds)
    }

    fn active_frame(&self) -> Option<FrameRef> {
        match self.frame.lock() {
            Ok(guard) => (*guard).clone(),
            Err(poisoned) => (*poisoned.into_inner()).clone(),
        }
    }

    fn set_frame(&self, frame: Option<FrameRef>) {
        match self.frame.lock() {
            Ok(mut guard) => *guard = frame,
            Err(poisoned) => *poisoned.into_inner() = frame,
        }
    }

    /// Document element of the referenced iframe, from a fresh pierced snapshot
    fn frame_document(&self, frame: &FrameRef) -> Result<Element<'_>> {
        let root = self
            .tab
            .call_method(DOM::GetDocument {
                // deep enough to reach documents nested inside iframes
                depth: Some(256),
                pierce: Some(true),
            })
            .map_err(|e| CourtsideError::Browser(format!("Failed to read document: {}", e)))?
            .root;

        let node = frame::select(&root, frame).ok_or_else(|| {
            let count = frame::top_level_iframes(&root).len();
            CourtsideError::FrameNotFound(format!("{} ({} iframes on page)", frame, count))
        })?;
        let document = node.content_document.as_ref().ok_or_else(|| {
            CourtsideError::FrameNotFound(format!("{} has no reachable document", frame))
        })?;

        Element::new(&self.tab, document.node_id)
            .map_err(|e| CourtsideError::FrameNotFound(format!("{}: {}", frame, e)))
    }

    /// Wait for the first element matching `locator` and act on it
    fn with_element<T>(
        &self,
        locator: &Locator,
        act: impl Fn(&Element<'_>) -> Result<T>,
    ) -> Result<T> {
        let timeout = self.element_timeout();
        let not_found = || CourtsideError::ElementNotFound {
            selector: locator.to_string(),
        };

        match self.active_frame() {
            None => {
                let element = match locator {
                    Locator::XPath(expr) => {
                        self.tab.wait_for_xpath_with_custom_timeout(expr, timeout)
                    }
                    _ => self
                        .tab
                        .wait_for_element_with_custom_timeout(&css_for(locator)?, timeout),
                }
                .map_err(|_e| not_found())?;
                act(&element)
            }
            Some(frame) => {
                let selector = css_for(locator)?;
                let deadline = Instant::now() + timeout;
                loop {
                    let document = self.frame_document(&frame)?;
                    if let Ok(element) = document.find_element(&selector) {
                        return act(&element);
                    }
                    if Instant::now() >= deadline {
                        return Err(not_found());
                    }
                    std::thread::sleep(FRAME_POLL_INTERVAL);
                }
            }
        }
    }

    /// Every element matching `locator` right now; a failed query is an empty match
    fn elements_matching(&self, locator: &Locator) -> Result<Vec<Element<'_>>> {
        let found = match self.active_frame() {
            None => match locator {
                Locator::XPath(expr) => self.tab.find_elements_by_xpath(expr),
                _ => self.tab.find_elements(&css_for(locator)?),
            },
            Some(frame) => {
                let document = self.frame_document(&frame)?;
                document.find_elements(&css_for(locator)?)
            }
        };

        Ok(found.unwrap_or_else(|e| {
            debug!("No elements for {}: {}", locator, e);
            Vec::new()
        }))
    }
}

/// CSS selector for a locator; XPath has no CSS form
fn css_for(locator: &Locator) -> Result<String> {
    match locator {
        Locator::Id(id) => Ok(format!("[id=\"{}\"]", id.replace('"', "\\\""))),
        Locator::Css(selector) => Ok(selector.clone()),
        Locator::XPath(expr) => Err(CourtsideError::Browser(format!(
            "XPath lookups are only supported in the top document: {}",
            expr
        ))),
    }
}

/// `href` as the browser resolved it, falling back to the raw attribute
fn resolved_href(element: &Element<'_>) -> Result<Option<String>> {
    let resolved = element
        .call_js_fn("function() { return this.href; }", vec![], false)
        .map_err(|e| CourtsideError::Browser(format!("Failed to read href: {}", e)))?;

    if let Some(serde_json::Value::String(href)) = resolved.value {
        if !href.is_empty() {
            return Ok(Some(href));
        }
    }

    element
        .get_attribute_value("href")
        .map_err(|e| CourtsideError::Browser(format!("Failed to read href: {}", e)))
}

#[async_trait]
impl PageAutomation for BrowserSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Navigating to {}", url);
        self.set_frame(None);

        self.tab
            .navigate_to(url)
            .map_err(|e| CourtsideError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| CourtsideError::Navigation {
                url: url.to_string(),
                reason: format!("navigation did not finish: {}", e),
            })?;

        info!("Successfully navigated to {}", url);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    async fn exists(&self, locator: &Locator) -> Result<bool> {
        Ok(!self.elements_matching(locator)?.is_empty())
    }

    async fn link_targets(&self, locator: &Locator) -> Result<Vec<String>> {
        let mut links = Vec::new();
        for element in self.elements_matching(locator)? {
            if let Some(href) = resolved_href(&element)? {
                links.push(href);
            }
        }
        debug!("{} links for {}", links.len(), locator);
        Ok(links)
    }

    async fn text_contents(&self, locator: &Locator) -> Result<Vec<String>> {
        self.elements_matching(locator)?
            .iter()
            .map(|element| {
                element
                    .get_inner_text()
                    .map_err(|e| CourtsideError::Browser(format!("Failed to read text: {}", e)))
            })
            .collect()
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        debug!("Clicking {}", locator);
        self.with_element(locator, |element| {
            // Box-model clicks land off target inside iframes; a DOM click does not.
            element
                .call_js_fn("function() { this.click(); }", vec![], false)
                .map(|_| ())
                .map_err(|e| {
                    CourtsideError::Browser(format!("Failed to click {}: {}", locator, e))
                })
        })
    }

    async fn type_text(&self, locator: &Locator, text: &str) -> Result<()> {
        debug!("Typing into {}", locator);
        self.with_element(locator, |element| {
            element
                .call_js_fn("function() { this.focus(); }", vec![], false)
                .map_err(|e| {
                    CourtsideError::Browser(format!("Failed to focus {}: {}", locator, e))
                })?;
            self.tab
                .type_str(text)
                .map(|_| ())
                .map_err(|e| {
                    CourtsideError::Browser(format!("Failed to type into {}: {}", locator, e))
                })
        })
    }

    async fn switch_to_frame(&self, frame: &FrameRef) -> Result<()> {
        debug!("Switching to {}", frame);
        self.frame_document(frame)?;
        self.set_frame(Some(frame.clone()));
        Ok(())
    }

    async fn switch_to_main(&self) -> Result<()> {
        self.set_frame(None);
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| CourtsideError::Screenshot(format!("CDP capture failed: {}", e)))
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("BrowserSession dropped, browser will be cleaned up");
    }
}
