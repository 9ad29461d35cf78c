//! In-memory page for driving the session and probe without a browser
//!
//! Elements are keyed by their locator. Waits on elements that are absent or
//! hidden sleep for the full bound and then time out, so tests should run
//! with tokio's clock paused.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use translit_harness::config::{TargetConfig, Timeouts};
use translit_harness::error::DriverError;
use translit_harness::locator::Locator;
use translit_harness::page::PageDriver;

pub const TARGET_URL: &str = "https://translit.test/";

pub fn target() -> TargetConfig {
    TargetConfig {
        url: TARGET_URL.to_string(),
        source_language: "singlish".to_string(),
        target_language: "sinhala".to_string(),
        switch_label: "Switch Typing Language".to_string(),
    }
}

pub fn input_box() -> Locator {
    Locator::placeholder("singlish")
}

pub fn switch() -> Locator {
    Locator::text("Switch Typing Language")
}

pub fn second_textarea() -> Locator {
    Locator::css("textarea", 1)
}

pub fn script_text() -> Locator {
    Locator::css_with_text("div, p, span", "[\\u0D80-\\u0DFF]")
}

/// Every driver call, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Goto(String),
    WaitVisible(String, Duration),
    IsVisible(String),
    Click(String),
    Fill(String, String),
    Press(String, String),
    Read(String, Duration),
    Body,
}

#[derive(Debug, Clone)]
struct Element {
    visible: bool,
    text: String,
    /// Reads fail with an evaluation error
    broken: bool,
}

#[derive(Default)]
struct State {
    elements: HashMap<String, Element>,
    body: Option<String>,
    navigation: Option<DriverError>,
    clicks: HashMap<String, u32>,
    /// Text changes applied when the switch is clicked for the nth time
    switch_effects: HashMap<u32, Vec<(String, String)>>,
    /// Text changes applied when Enter is pressed
    submit_effects: Vec<(String, String)>,
    hide_switch_after_click: bool,
    failing_clicks: bool,
    calls: Vec<Call>,
}

/// Scripted [`PageDriver`]; clones share the same page
#[derive(Clone, Default)]
pub struct FakePage {
    state: Arc<Mutex<State>>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A visible element with the given text
    pub fn with(self, locator: Locator, text: &str) -> Self {
        self.set(&locator, text, true);
        self
    }

    /// An element that exists but is not rendered
    pub fn with_hidden(self, locator: Locator, text: &str) -> Self {
        self.set(&locator, text, false);
        self
    }

    /// An element whose reads fail
    pub fn with_broken(self, locator: Locator) -> Self {
        self.state.lock().unwrap().elements.insert(
            locator.to_string(),
            Element {
                visible: true,
                text: String::new(),
                broken: true,
            },
        );
        self
    }

    /// Body text returned by document scans; defaults to all visible element texts
    pub fn with_body(self, body: &str) -> Self {
        self.state.lock().unwrap().body = Some(body.to_string());
        self
    }

    /// Navigation fails with `error`
    pub fn failing_navigation(self, error: DriverError) -> Self {
        self.state.lock().unwrap().navigation = Some(error);
        self
    }

    /// The switch is present and visible
    pub fn with_switch(self) -> Self {
        self.with(switch(), "Switch Typing Language")
    }

    /// The switch disappears once clicked
    pub fn hiding_switch_after_click(self) -> Self {
        self.state.lock().unwrap().hide_switch_after_click = true;
        self
    }

    /// Every click reports failure after being counted
    pub fn failing_clicks(self) -> Self {
        self.state.lock().unwrap().failing_clicks = true;
        self
    }

    /// Set `locator`'s text when the switch is clicked the `nth` time (1-based)
    pub fn on_switch_click(self, nth: u32, locator: Locator, text: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .switch_effects
            .entry(nth)
            .or_default()
            .push((locator.to_string(), text.to_string()));
        self
    }

    /// Set `locator`'s text when Enter is pressed
    pub fn on_submit(self, locator: Locator, text: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .submit_effects
            .push((locator.to_string(), text.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clicks(&self, locator: &Locator) -> u32 {
        self.state
            .lock()
            .unwrap()
            .clicks
            .get(&locator.to_string())
            .copied()
            .unwrap_or(0)
    }

    pub fn text_of(&self, locator: &Locator) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .elements
            .get(&locator.to_string())
            .map(|e| e.text.clone())
    }

    /// Locators read, in order
    pub fn reads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Read(locator, _) => Some(locator),
                _ => None,
            })
            .collect()
    }

    fn set(&self, locator: &Locator, text: &str, visible: bool) {
        self.state.lock().unwrap().elements.insert(
            locator.to_string(),
            Element {
                visible,
                text: text.to_string(),
                broken: false,
            },
        );
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn visible(&self, locator: &Locator) -> Option<Element> {
        self.state
            .lock()
            .unwrap()
            .elements
            .get(&locator.to_string())
            .filter(|e| e.visible)
            .cloned()
    }

    async fn expire(&self, locator: &Locator, limit: Duration) -> DriverError {
        sleep(limit).await;
        DriverError::timeout(locator.to_string(), limit)
    }

    fn apply(&self, effects: Vec<(String, String)>) {
        let mut state = self.state.lock().unwrap();
        for (key, text) in effects {
            state
                .elements
                .entry(key)
                .and_modify(|e| e.text = text.clone())
                .or_insert(Element {
                    visible: true,
                    text,
                    broken: false,
                });
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str, limit: Duration) -> Result<(), DriverError> {
        self.record(Call::Goto(url.to_string()));
        let failure = self.state.lock().unwrap().navigation.clone();
        match failure {
            Some(DriverError::Timeout { .. }) => {
                sleep(limit).await;
                Err(DriverError::timeout(format!("navigation to {}", url), limit))
            }
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn wait_visible(&self, locator: &Locator, limit: Duration) -> Result<(), DriverError> {
        self.record(Call::WaitVisible(locator.to_string(), limit));
        match self.visible(locator) {
            Some(_) => Ok(()),
            None => Err(self.expire(locator, limit).await),
        }
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError> {
        self.record(Call::IsVisible(locator.to_string()));
        Ok(self.visible(locator).is_some())
    }

    async fn click(&self, locator: &Locator, limit: Duration) -> Result<(), DriverError> {
        self.record(Call::Click(locator.to_string()));
        if self.visible(locator).is_none() {
            return Err(self.expire(locator, limit).await);
        }

        let key = locator.to_string();
        let (nth, failing) = {
            let mut state = self.state.lock().unwrap();
            let count = state.clicks.entry(key.clone()).or_insert(0);
            *count += 1;
            let nth = *count;
            if key == switch().to_string() && state.hide_switch_after_click {
                if let Some(e) = state.elements.get_mut(&key) {
                    e.visible = false;
                }
            }
            (nth, state.failing_clicks)
        };

        if key == switch().to_string() {
            let effects = self
                .state
                .lock()
                .unwrap()
                .switch_effects
                .remove(&nth)
                .unwrap_or_default();
            self.apply(effects);
        }

        if failing {
            return Err(DriverError::NotActionable(key));
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str, limit: Duration) -> Result<(), DriverError> {
        self.record(Call::Fill(locator.to_string(), text.to_string()));
        if self.visible(locator).is_none() {
            return Err(self.expire(locator, limit).await);
        }
        self.set(locator, text, true);
        Ok(())
    }

    async fn press(&self, locator: &Locator, key: &str, limit: Duration) -> Result<(), DriverError> {
        self.record(Call::Press(locator.to_string(), key.to_string()));
        if self.visible(locator).is_none() {
            return Err(self.expire(locator, limit).await);
        }
        if key == "Enter" {
            let effects = std::mem::take(&mut self.state.lock().unwrap().submit_effects);
            self.apply(effects);
        }
        Ok(())
    }

    async fn inner_text(&self, locator: &Locator, limit: Duration) -> Result<String, DriverError> {
        self.record(Call::Read(locator.to_string(), limit));
        let element = self
            .state
            .lock()
            .unwrap()
            .elements
            .get(&locator.to_string())
            .cloned();
        match element {
            Some(e) if e.broken => Err(DriverError::Evaluation("detached node".to_string())),
            Some(e) => Ok(e.text),
            None => Err(self.expire(locator, limit).await),
        }
    }

    async fn body_text(&self, _limit: Duration) -> Result<String, DriverError> {
        self.record(Call::Body);
        let state = self.state.lock().unwrap();
        if let Some(body) = &state.body {
            return Ok(body.clone());
        }
        let mut texts: Vec<_> = state
            .elements
            .values()
            .filter(|e| e.visible)
            .map(|e| e.text.clone())
            .collect();
        texts.sort();
        Ok(texts.join("\n"))
    }
}

/// Default timeouts
pub fn timeouts() -> Timeouts {
    Timeouts::default()
}
