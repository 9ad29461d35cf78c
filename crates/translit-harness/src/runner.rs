//! Suite execution orchestration
//!
//! The runner launches one browser and gives every scenario attempt its own
//! tab, so sessions are never shared. Scenarios run concurrently up to
//! `run.parallel_contexts`; inside a tab every step is sequential.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Browser Instance                      │
//! ├─────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────┐        │
//! │  │    Tab 1    │ │    Tab 2    │ │    Tab 3    │ ...    │
//! │  │ Pos_Fun_001 │ │ Pos_Fun_002 │ │ Neg_Fun_001 │        │
//! │  │  attempt 1  │ │  attempt 1  │ │  attempt 2  │        │
//! │  └─────────────┘ └─────────────┘ └─────────────┘        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use translit_harness::{Config, runner::SuiteRunner};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_file("suites/swift_translator.toml")?;
//! let runner = SuiteRunner::new(config.run.headless).await?;
//! let results = runner.run(&config).await?;
//! runner.close().await;
//!
//! for result in &results.scenario_results {
//!     println!("{}: {}", result.id, if result.passed { "ok" } else { "FAILED" });
//! }
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use chromiumoxide::browser::Browser;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

use crate::browser::{self, BrowserTask};
use crate::config::{Config, Scenario};
use crate::expectation::{self, Observation};
use crate::page::{ChromePage, PageDriver};
use crate::probe::{ConversionProbe, ProbeResult, Provenance};
use crate::script::SINHALA;
use crate::session::Session;

/// Results from a complete suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResults {
    /// URL of the service under test
    pub target_url: String,
    /// Results for each scenario, in configuration order
    pub scenario_results: Vec<ScenarioResult>,
    /// Total duration of the run
    pub total_duration_ms: u64,
    /// Whether every scenario passed
    pub passed: bool,
    /// One line per failed scenario
    pub failures: Vec<String>,
    /// Timestamp when the run started
    pub started_at: String,
}

impl SuiteResults {
    pub fn passed_count(&self) -> usize {
        self.scenario_results.iter().filter(|r| r.passed).count()
    }

    pub fn failed_count(&self) -> usize {
        self.scenario_results.len() - self.passed_count()
    }
}

/// Result of one scenario, from its last attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub id: String,
    pub name: String,
    pub input: String,
    /// Resolved output; `None` when the session failed before resolution
    pub output: Option<String>,
    pub provenance: Option<Provenance>,
    /// Fill, key press and settle delay of the last attempt
    pub submit_duration_ms: Option<u64>,
    /// Mode switch clicks in the last attempt
    pub toggle_clicks: u32,
    pub passed: bool,
    /// Expectation mismatches of the last attempt
    pub failures: Vec<String>,
    /// Fatal session error of the last attempt, if any
    pub error: Option<String>,
    /// Attempts made, including retries
    pub attempts: u32,
    pub duration_ms: u64,
}

/// Outcome of one attempt in one tab
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub probe: Option<ProbeResult>,
    pub failures: Vec<String>,
    pub error: Option<String>,
}

impl AttemptOutcome {
    pub fn passed(&self) -> bool {
        self.error.is_none() && self.failures.is_empty()
    }
}

/// Run one scenario in a fresh session on `page`, then hand the page back.
///
/// A fatal session error (navigation timeout, missing input) is recorded in
/// [`AttemptOutcome::error`]; expectation mismatches go to
/// [`AttemptOutcome::failures`].
pub async fn execute_scenario<P: PageDriver>(
    config: &Config,
    probe: &ConversionProbe,
    scenario: &Scenario,
    page: P,
) -> (AttemptOutcome, P) {
    let mut session = Session::new(page, config.target.clone(), config.timeouts);

    let outcome = match probe
        .convert(&mut session, &scenario.input, scenario.toggles_switch(&config.run))
        .await
    {
        Ok(result) => {
            let observation = Observation {
                output: &result.output,
                response_time: result.submit_duration,
                script: probe.script(),
            };
            let failures = expectation::check_all(&scenario.expect, &observation);
            AttemptOutcome {
                probe: Some(result),
                failures,
                error: None,
            }
        }
        Err(e) => AttemptOutcome {
            probe: None,
            failures: Vec::new(),
            error: Some(e.to_string()),
        },
    };

    (outcome, session.into_page())
}

/// The suite runner
pub struct SuiteRunner {
    browser: Browser,
    task: BrowserTask,
}

impl SuiteRunner {
    /// Launch a browser for running suites
    pub async fn new(headless: bool) -> Result<Self> {
        let (browser, task) = browser::launch(headless).await?;
        info!(
            "Browser launched successfully (profile: {})",
            task.profile_dir().display()
        );
        Ok(Self { browser, task })
    }

    /// Close the browser and remove its profile directory
    pub async fn close(self) {
        browser::close(self.browser, self.task).await;
    }

    /// Run every scenario of the configuration
    #[instrument(skip(self, config), fields(target = %config.target.url))]
    pub async fn run(&self, config: &Config) -> Result<SuiteResults> {
        let start_time = Instant::now();
        let started_at = chrono::Utc::now().to_rfc3339();
        let parallel_contexts = config.run.parallel_contexts.max(1) as usize;
        let probe = ConversionProbe::new(&config.target, SINHALA);

        info!(
            "Running {} scenarios against {} ({} parallel)",
            config.scenarios.len(),
            config.target.url,
            parallel_contexts
        );

        if let Some(dir) = &config.run.artifacts_dir {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create artifacts dir: {}", dir.display()))?;
        }

        let semaphore = Arc::new(Semaphore::new(parallel_contexts));
        let scenario_futures: Vec<_> = config
            .scenarios
            .iter()
            .map(|scenario| {
                let sem = semaphore.clone();
                let probe = &probe;
                async move {
                    let _permit = sem.acquire().await;
                    self.run_scenario(config, probe, scenario).await
                }
            })
            .collect();

        let scenario_results: Vec<ScenarioResult> = stream::iter(scenario_futures)
            .buffered(parallel_contexts)
            .collect()
            .await;

        let failures: Vec<String> = scenario_results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| {
                let reason = r
                    .error
                    .clone()
                    .unwrap_or_else(|| r.failures.join("; "));
                format!("{}: {}", r.id, reason)
            })
            .collect();
        let passed = failures.is_empty();

        let results = SuiteResults {
            target_url: config.target.url.clone(),
            scenario_results,
            total_duration_ms: start_time.elapsed().as_millis() as u64,
            passed,
            failures,
            started_at,
        };

        if passed {
            info!(
                "All {} scenarios passed in {}ms",
                results.scenario_results.len(),
                results.total_duration_ms
            );
        } else {
            warn!(
                "{} of {} scenarios failed",
                results.failed_count(),
                results.scenario_results.len()
            );
        }

        Ok(results)
    }

    /// Run one scenario, retrying in a fresh tab while it fails
    #[instrument(skip(self, config, probe, scenario), fields(scenario = %scenario.id))]
    async fn run_scenario(
        &self,
        config: &Config,
        probe: &ConversionProbe,
        scenario: &Scenario,
    ) -> ScenarioResult {
        let start_time = Instant::now();
        let max_attempts = config.run.retries + 1;
        let mut attempts = 0;
        let mut outcome = AttemptOutcome {
            probe: None,
            failures: Vec::new(),
            error: None,
        };

        while attempts < max_attempts {
            attempts += 1;
            let is_last = attempts == max_attempts;

            let page = match self.browser.new_page("about:blank").await {
                Ok(p) => ChromePage::new(p),
                Err(e) => {
                    error!("Failed to create page: {}", e);
                    outcome = AttemptOutcome {
                        probe: None,
                        failures: Vec::new(),
                        error: Some(format!("Failed to create page: {}", e)),
                    };
                    continue;
                }
            };

            let (attempt, page) = execute_scenario(config, probe, scenario, page).await;
            outcome = attempt;

            if !outcome.passed() && is_last {
                if let Some(dir) = &config.run.artifacts_dir {
                    let path = dir.join(format!("{}.png", scenario.id));
                    match page.save_screenshot(&path).await {
                        Ok(()) => info!("Saved failure screenshot to {}", path.display()),
                        Err(e) => warn!("Failed to save screenshot: {}", e),
                    }
                }
            }

            let _ = page.close().await;

            if outcome.passed() {
                break;
            }
            if !is_last {
                warn!("Attempt {} of {} failed, retrying", attempts, max_attempts);
            }
        }

        let passed = outcome.passed();
        let probe_result = outcome.probe;
        ScenarioResult {
            id: scenario.id.clone(),
            name: scenario.name.clone(),
            input: scenario.input.clone(),
            output: probe_result.as_ref().map(|p| p.output.clone()),
            provenance: probe_result.as_ref().map(|p| p.provenance),
            submit_duration_ms: probe_result
                .as_ref()
                .map(|p| p.submit_duration.as_millis() as u64),
            toggle_clicks: probe_result.as_ref().map_or(0, |p| p.toggle_clicks),
            passed,
            failures: outcome.failures,
            error: outcome.error,
            attempts,
            duration_ms: start_time.elapsed().as_millis() as u64,
        }
    }
}
