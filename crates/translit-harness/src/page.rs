//! Browser tab access
//!
//! [`PageDriver`] is the only way the session and probe touch the browser.
//! [`ChromePage`] implements it on a chromiumoxide [`Page`] by evaluating the
//! DOM helpers in `scripts/page_helpers.js`; tests substitute an in-memory page.
//!
//! Every wait is bounded. A wait that expires returns
//! [`DriverError::Timeout`] and leaves it to the caller to fall back or fail.

use async_trait::async_trait;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, instrument, trace};

use crate::error::DriverError;
use crate::locator::Locator;

/// Embedded DOM helper function, see `scripts/page_helpers.js`
pub const PAGE_HELPERS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/scripts/page_helpers.js"
));

/// Attribute used to hand an element located by script over to CDP input events
const MARK_ATTR: &str = "data-translit-probe";

/// Delay between polls while waiting on an element
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Operations on one browser tab
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate and wait for the page to settle
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    /// Wait until the element exists and is visible
    async fn wait_visible(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError>;

    /// Current visibility, without waiting
    async fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError>;

    /// Click the element once it is visible
    async fn click(&self, locator: &Locator, timeout: Duration) -> Result<(), DriverError>;

    /// Replace the element's content with `text`
    async fn fill(&self, locator: &Locator, text: &str, timeout: Duration)
        -> Result<(), DriverError>;

    /// Press a key with the element focused
    async fn press(&self, locator: &Locator, key: &str, timeout: Duration)
        -> Result<(), DriverError>;

    /// Rendered text of the element (value for form controls)
    async fn inner_text(&self, locator: &Locator, timeout: Duration)
        -> Result<String, DriverError>;

    /// Rendered text of the whole document body
    async fn body_text(&self, timeout: Duration) -> Result<String, DriverError>;
}

/// What the page helpers report back
#[derive(Debug, Clone, Default, Deserialize)]
struct HelperResult {
    found: bool,
    visible: bool,
    text: Option<String>,
}

/// [`PageDriver`] over a chromiumoxide tab
pub struct ChromePage {
    page: Page,
    poll_interval: Duration,
    marks: AtomicU64,
}

impl ChromePage {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            poll_interval: DEFAULT_POLL_INTERVAL,
            marks: AtomicU64::new(0),
        }
    }

    /// Override the polling interval used by bounded waits
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// The underlying chromiumoxide page
    pub fn inner(&self) -> &Page {
        &self.page
    }

    /// Save a full-page PNG screenshot
    pub async fn save_screenshot(&self, path: &Path) -> Result<(), DriverError> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page
            .save_screenshot(params, path)
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))?;
        Ok(())
    }

    /// Close the tab
    pub async fn close(self) -> Result<(), DriverError> {
        self.page
            .close()
            .await
            .map_err(|e| DriverError::Browser(e.to_string()))
    }

    async fn run_helper(
        &self,
        locator: Option<&Locator>,
        op: &str,
        arg: Option<&str>,
    ) -> Result<HelperResult, DriverError> {
        let locator_json = serde_json::to_string(&locator)
            .map_err(|e| DriverError::Evaluation(e.to_string()))?;
        let op_json =
            serde_json::to_string(op).map_err(|e| DriverError::Evaluation(e.to_string()))?;
        let arg_json =
            serde_json::to_string(&arg).map_err(|e| DriverError::Evaluation(e.to_string()))?;
        let script = format!(
            "(() => {{ const helpers = {}; return helpers({}, {}, {}); }})()",
            PAGE_HELPERS.trim().trim_end_matches(';'),
            locator_json,
            op_json,
            arg_json
        );

        self.page
            .evaluate(script.as_str())
            .await
            .map_err(|e| DriverError::Evaluation(e.to_string()))?
            .into_value::<HelperResult>()
            .map_err(|e| DriverError::Evaluation(e.to_string()))
    }

    /// Poll the helper until `ready` accepts its result or `limit` elapses
    async fn poll_until<F>(
        &self,
        locator: &Locator,
        op: &str,
        arg: Option<&str>,
        limit: Duration,
        ready: F,
    ) -> Result<HelperResult, DriverError>
    where
        F: Fn(&HelperResult) -> bool + Send,
    {
        let attempt = async {
            loop {
                let result = self.run_helper(Some(locator), op, arg).await?;
                if ready(&result) {
                    return Ok(result);
                }
                trace!("Waiting on {} ({})", locator, op);
                sleep(self.poll_interval).await;
            }
        };

        match timeout(limit, attempt).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::timeout(locator.to_string(), limit)),
        }
    }

    /// Tag the element with a unique marker once it is visible, and return a CSS selector for it
    async fn mark_visible(&self, locator: &Locator, limit: Duration) -> Result<String, DriverError> {
        let token = format!("m{}", self.marks.fetch_add(1, Ordering::Relaxed));
        self.poll_until(locator, "mark", Some(&token), limit, |r| r.found && r.visible)
            .await?;
        Ok(format!("[{}=\"{}\"]", MARK_ATTR, token))
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    #[instrument(skip(self), fields(url = %url))]
    async fn goto(&self, url: &str, limit: Duration) -> Result<(), DriverError> {
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| DriverError::Navigation(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| DriverError::Navigation(e.to_string()))?;
            Ok(())
        };

        match timeout(limit, navigation).await {
            Ok(result) => result,
            Err(_) => Err(DriverError::timeout(format!("navigation to {}", url), limit)),
        }
    }

    async fn wait_visible(&self, locator: &Locator, limit: Duration) -> Result<(), DriverError> {
        self.poll_until(locator, "probe", None, limit, |r| r.found && r.visible)
            .await
            .map(|_| ())
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError> {
        let result = self.run_helper(Some(locator), "probe", None).await?;
        Ok(result.found && result.visible)
    }

    async fn click(&self, locator: &Locator, limit: Duration) -> Result<(), DriverError> {
        let selector = self.mark_visible(locator, limit).await?;
        debug!("Clicking {}", locator);
        let element = self
            .page
            .find_element(selector.as_str())
            .await
            .map_err(|_| DriverError::ElementNotFound(locator.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| DriverError::NotActionable(format!("{}: {}", locator, e)))?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str, limit: Duration) -> Result<(), DriverError> {
        self.wait_visible(locator, limit).await?;
        let result = self.run_helper(Some(locator), "fill", Some(text)).await?;
        if !result.found {
            return Err(DriverError::ElementNotFound(locator.to_string()));
        }
        if result.text.is_none() {
            return Err(DriverError::NotActionable(format!(
                "{} is not an editable control",
                locator
            )));
        }
        Ok(())
    }

    async fn press(&self, locator: &Locator, key: &str, limit: Duration) -> Result<(), DriverError> {
        let selector = self.mark_visible(locator, limit).await?;
        let element = self
            .page
            .find_element(selector.as_str())
            .await
            .map_err(|_| DriverError::ElementNotFound(locator.to_string()))?;
        element
            .focus()
            .await
            .map_err(|e| DriverError::NotActionable(e.to_string()))?;
        element
            .press_key(key)
            .await
            .map_err(|e| DriverError::NotActionable(format!("{}: {}", locator, e)))?;
        Ok(())
    }

    async fn inner_text(&self, locator: &Locator, limit: Duration) -> Result<String, DriverError> {
        let result = self
            .poll_until(locator, "text", None, limit, |r| r.found)
            .await?;
        result
            .text
            .ok_or_else(|| DriverError::ElementNotFound(locator.to_string()))
    }

    async fn body_text(&self, limit: Duration) -> Result<String, DriverError> {
        match timeout(limit, self.run_helper(None, "body", None)).await {
            Ok(result) => result?
                .text
                .ok_or_else(|| DriverError::ElementNotFound("body".to_string())),
            Err(_) => Err(DriverError::timeout("body text", limit)),
        }
    }
}
