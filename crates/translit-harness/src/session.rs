//! Page session driver
//!
//! A [`Session`] owns one tab bound to one target URL. It navigates, waits for
//! the page to settle, and optionally flips the service's mode switch. The
//! switch is a best-effort affordance: its absence is normal and click
//! failures are swallowed, but the attempt is recorded so the probe can undo
//! it later.
//!
//! Mode switch states:
//!
//! ```text
//! NotToggled --toggle_mode_switch (switch visible)--> Toggled
//! Toggled    --revert_mode_switch (switch visible)--> ToggledAndReverted
//! ```
//!
//! No other transitions exist, so a session clicks the switch at most twice.

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, instrument};

use crate::config::{TargetConfig, Timeouts};
use crate::error::{DriverError, HarnessError, HarnessResult};
use crate::locator::{self, Locator};
use crate::page::PageDriver;

/// Navigation state of the tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavState {
    Blank,
    Loaded,
}

/// Mode switch state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleState {
    NotToggled,
    Toggled,
    ToggledAndReverted,
}

/// One tab, one target, one scenario
pub struct Session<P: PageDriver> {
    page: P,
    target: TargetConfig,
    timeouts: Timeouts,
    switch: Locator,
    nav: NavState,
    toggle: ToggleState,
    toggle_clicks: u32,
}

impl<P: PageDriver> Session<P> {
    pub fn new(page: P, target: TargetConfig, timeouts: Timeouts) -> Self {
        let switch = locator::mode_switch(&target);
        Self {
            page,
            target,
            timeouts,
            switch,
            nav: NavState::Blank,
            toggle: ToggleState::NotToggled,
            toggle_clicks: 0,
        }
    }

    /// Navigate to `url` and wait for the page to settle
    ///
    /// # Errors
    ///
    /// [`HarnessError::NavigationTimeout`] if the page does not settle within the
    /// navigation timeout; [`HarnessError::Driver`] for other navigation failures.
    #[instrument(skip(self))]
    pub async fn open(&mut self, url: &str) -> HarnessResult<()> {
        let limit = self.timeouts.navigation;
        match self.page.goto(url, limit).await {
            Ok(()) => {
                debug!("Page settled: {}", url);
                self.nav = NavState::Loaded;
                Ok(())
            }
            Err(DriverError::Timeout { .. }) => Err(HarnessError::NavigationTimeout {
                url: url.to_string(),
                timeout: limit,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Navigate to the configured target URL
    pub async fn open_target(&mut self) -> HarnessResult<()> {
        let url = self.target.url.clone();
        self.open(&url).await
    }

    /// Click the mode switch if it shows up within the visibility bound.
    ///
    /// Returns whether the toggle was applied. Absence of the switch is a
    /// no-op; a failed click still counts as applied.
    #[instrument(skip(self))]
    pub async fn toggle_mode_switch(&mut self) -> bool {
        if self.toggle != ToggleState::NotToggled {
            return false;
        }

        if let Err(e) = self
            .page
            .wait_visible(&self.switch, self.timeouts.switch_visible)
            .await
        {
            debug!("Mode switch not available: {}", e);
            return false;
        }

        info!("Switch visible, clicking once");
        self.click_switch().await;
        self.toggle = ToggleState::Toggled;
        true
    }

    /// Undo an earlier toggle if the switch is still visible.
    ///
    /// Returns whether the reverting click was made.
    #[instrument(skip(self))]
    pub async fn revert_mode_switch(&mut self) -> bool {
        if self.toggle != ToggleState::Toggled {
            return false;
        }
        match self.page.is_visible(&self.switch).await {
            Ok(true) => {}
            Ok(false) => {
                debug!("Mode switch no longer visible, not reverting");
                return false;
            }
            Err(e) => {
                debug!("Mode switch visibility check failed: {}", e);
                return false;
            }
        }

        self.click_switch().await;
        self.toggle = ToggleState::ToggledAndReverted;
        true
    }

    async fn click_switch(&mut self) {
        self.toggle_clicks += 1;
        if let Err(e) = self
            .page
            .click(&self.switch, self.timeouts.switch_click)
            .await
        {
            debug!("Mode switch click failed: {}", e);
        }
        sleep(self.timeouts.toggle_settle).await;
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    pub fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    pub fn nav_state(&self) -> NavState {
        self.nav
    }

    pub fn toggle_state(&self) -> ToggleState {
        self.toggle
    }

    /// Mode switch clicks issued so far, including failed ones
    pub fn toggle_clicks(&self) -> u32 {
        self.toggle_clicks
    }

    /// Give the tab back, e.g. to close it
    pub fn into_page(self) -> P {
        self.page
    }
}
