//! Configuration parsing for conversion suites
//!
//! This module provides TOML-based configuration for the target service, the
//! bounded waits and settle delays the probe uses, run settings, and the
//! scenarios to execute.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::expectation::Expectation;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service under test
    pub target: TargetConfig,
    /// Bounded waits and settle delays
    #[serde(default)]
    pub timeouts: Timeouts,
    /// Runner settings
    #[serde(default)]
    pub run: RunConfig,
    /// Scenarios to execute
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - Required fields are missing
    ///
    /// # Example
    ///
    /// ```no_run
    /// use translit_harness::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = Config::from_file("suites/swift_translator.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use translit_harness::config::Config;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [target]
    ///     url = "https://www.swifttranslator.com/"
    ///
    ///     [[scenarios]]
    ///     id = "Pos_Fun_0010"
    ///     input = "vahaama enna"
    ///     expect = [{ type = "contains", phrase = "එන්න" }]
    /// "#;
    /// let config = Config::parse(toml)?;
    /// assert_eq!(config.scenarios.len(), 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.target.url.trim().is_empty() {
            anyhow::bail!("target.url must not be empty");
        }
        if self.run.parallel_contexts == 0 {
            anyhow::bail!("run.parallel_contexts must be at least 1");
        }
        let mut seen = std::collections::HashSet::new();
        for scenario in &self.scenarios {
            if !seen.insert(scenario.id.as_str()) {
                anyhow::bail!("Duplicate scenario id: {}", scenario.id);
            }
            for expectation in &scenario.expect {
                expectation
                    .validate()
                    .with_context(|| format!("Invalid expectation in {}", scenario.id))?;
            }
        }
        Ok(())
    }
}

/// The service under test and the phrases used to find its controls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Page URL
    pub url: String,
    /// Case-insensitive pattern naming the source language (input control)
    #[serde(default = "default_source_language")]
    pub source_language: String,
    /// Case-insensitive pattern naming the target language (output control)
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Text of the mode-switch control, matched as a case-insensitive substring
    #[serde(default = "default_switch_label")]
    pub switch_label: String,
}

fn default_source_language() -> String {
    "singlish".to_string()
}

fn default_target_language() -> String {
    "sinhala".to_string()
}

fn default_switch_label() -> String {
    "Switch Typing Language".to_string()
}

/// Bounded waits and fixed settle delays, all in milliseconds in TOML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Max wait for the page to settle after navigation
    #[serde(with = "duration_ms")]
    pub navigation: Duration,
    /// Max wait for any single observable condition
    #[serde(with = "duration_ms")]
    pub assertion: Duration,
    /// Max wait for an interaction to become possible
    #[serde(with = "duration_ms")]
    pub action: Duration,
    /// How long the mode switch may take to become visible
    #[serde(with = "duration_ms")]
    pub switch_visible: Duration,
    /// Max wait for the mode-switch click
    #[serde(with = "duration_ms")]
    pub switch_click: Duration,
    /// Wait for the input control located by placeholder
    #[serde(with = "duration_ms")]
    pub input_placeholder: Duration,
    /// Wait for the input control located by accessible label
    #[serde(with = "duration_ms")]
    pub input_label: Duration,
    /// Wait for the first generic multi-line text control
    #[serde(with = "duration_ms")]
    pub input_fallback: Duration,
    /// Per-candidate text read
    #[serde(with = "duration_ms")]
    pub candidate_read: Duration,
    /// Per-candidate text read during the compensating pass
    #[serde(with = "duration_ms")]
    pub candidate_retry_read: Duration,
    /// Settle delay after submitting input
    #[serde(with = "duration_ms")]
    pub submit_settle: Duration,
    /// Settle delay after clicking the mode switch
    #[serde(with = "duration_ms")]
    pub toggle_settle: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: Duration::from_secs(60),
            assertion: Duration::from_secs(15),
            action: Duration::from_secs(15),
            switch_visible: Duration::from_secs(5),
            switch_click: Duration::from_secs(10),
            input_placeholder: Duration::from_secs(10),
            input_label: Duration::from_secs(10),
            input_fallback: Duration::from_secs(15),
            candidate_read: Duration::from_secs(6),
            candidate_retry_read: Duration::from_secs(3),
            submit_settle: Duration::from_secs(4),
            toggle_settle: Duration::from_millis(1500),
        }
    }
}

/// Runner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of scenarios run concurrently, each in its own tab (default: 4)
    pub parallel_contexts: u32,
    /// Extra attempts for a failing scenario, each in a fresh tab (default: 0)
    pub retries: u32,
    /// Whether to try the mode switch before submitting (default: true)
    pub toggle_switch: bool,
    /// Run Chrome without a window (default: true)
    pub headless: bool,
    /// Directory for failure screenshots; none are taken when unset
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel_contexts: 4,
            retries: 0,
            toggle_switch: true,
            headless: true,
            artifacts_dir: None,
        }
    }
}

/// One input string and the properties its output must have
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Stable identifier, e.g. `Pos_Fun_0010`
    pub id: String,
    /// Description shown in reports
    #[serde(default)]
    pub name: String,
    /// Literal text submitted to the service
    pub input: String,
    /// Properties checked against the resolved output
    #[serde(default)]
    pub expect: Vec<Expectation>,
    /// Overrides `run.toggle_switch` for this scenario
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toggle_switch: Option<bool>,
}

impl Scenario {
    /// Whether the mode switch is tried before submitting this scenario
    pub fn toggles_switch(&self, run: &RunConfig) -> bool {
        self.toggle_switch.unwrap_or(run.toggle_switch)
    }
}

/// Serde module for serializing/deserializing Duration as milliseconds
pub(crate) mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
