//! Conversion probe: submit input, then resolve the converted output
//!
//! Output resolution runs in strict order and the first satisfying step wins:
//!
//! 1. **Candidate scan**: each [`Candidate`] in priority order gets one bounded
//!    read. Text is accepted only if it is non-empty after trimming and holds
//!    at least one target-script character. A failed read moves on to the
//!    next candidate.
//! 2. **Document scan**: the body text is reduced to its target-script runs,
//!    joined by single spaces.
//! 3. **Compensating toggle**: if the session flipped the mode switch and
//!    there is still no target-script text, the switch is clicked back once
//!    and the candidate scan (not the document scan) runs again with the
//!    shorter retry read bound.
//!
//! Whatever is held after that is returned, possibly empty. Only a missing
//! input control or a failing interaction with it is an error.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument};

use crate::config::TargetConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::locator::{self, Candidate, CandidateKind, InputKind, Locator};
use crate::page::PageDriver;
use crate::script::{ScriptExtractor, TargetScript};
use crate::session::{Session, ToggleState};

/// Where the returned output came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "candidate", rename_all = "snake_case")]
pub enum Provenance {
    /// Accepted from a candidate on the first scan
    Candidate(CandidateKind),
    /// Extracted from the whole document body
    DocumentScan,
    /// Accepted from a candidate after the compensating toggle
    Compensated(CandidateKind),
    /// Nothing found
    Unresolved,
}

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Resolved output, possibly empty
    pub output: String,
    /// Which step produced `output`; diagnostic only
    pub provenance: Provenance,
    /// Strategy that located the input control
    pub input: InputKind,
    /// Fill, key press and settle delay
    #[serde(with = "crate::config::duration_ms")]
    pub submit_duration: Duration,
    /// Mode switch clicks made in this session so far
    pub toggle_clicks: u32,
}

/// Submits input and resolves converted output
#[derive(Debug, Clone)]
pub struct ConversionProbe {
    candidates: Vec<Candidate>,
    extractor: ScriptExtractor,
}

impl ConversionProbe {
    pub fn new(target: &TargetConfig, script: TargetScript) -> Self {
        Self {
            candidates: locator::output_candidates(target, &script),
            extractor: ScriptExtractor::new(script),
        }
    }

    pub fn script(&self) -> TargetScript {
        self.extractor.script()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Open the target, optionally flip the mode switch, then submit and resolve
    pub async fn convert<P: PageDriver>(
        &self,
        session: &mut Session<P>,
        input: &str,
        toggle_switch: bool,
    ) -> HarnessResult<ProbeResult> {
        session.open_target().await?;
        if toggle_switch {
            session.toggle_mode_switch().await;
        }
        self.submit_and_resolve(session, input).await
    }

    /// Submit `input` and resolve the converted output.
    ///
    /// # Errors
    ///
    /// [`HarnessError::InputNotFound`] if no input strategy locates a control,
    /// or a driver error if filling or pressing Enter on it fails. Failing to
    /// find output is never an error.
    #[instrument(skip(self, session, input), fields(input = %preview(input, 50)))]
    pub async fn submit_and_resolve<P: PageDriver>(
        &self,
        session: &mut Session<P>,
        input: &str,
    ) -> HarnessResult<ProbeResult> {
        let script = self.script();
        let timeouts = *session.timeouts();

        let (input_kind, control) = self.locate_input(session).await?;

        let started = Instant::now();
        session
            .page()
            .fill(&control, input, timeouts.action)
            .await?;
        session
            .page()
            .press(&control, "Enter", timeouts.action)
            .await?;
        sleep(timeouts.submit_settle).await;
        let submit_duration = started.elapsed();

        let mut output = String::new();
        let mut provenance = Provenance::Unresolved;

        if let Some((kind, text)) = self
            .scan_candidates(session.page(), timeouts.candidate_read)
            .await
        {
            output = text;
            provenance = Provenance::Candidate(kind);
        }

        if !script.contains(&output) {
            info!("Fallback triggered - scanning document body");
            match session.page().body_text(timeouts.assertion).await {
                Ok(body) => {
                    let joined = self.extractor.extract(&body);
                    if !joined.is_empty() {
                        output = joined;
                        provenance = Provenance::DocumentScan;
                    }
                }
                Err(e) => debug!("Document scan failed: {}", e),
            }
        }

        if session.toggle_state() == ToggleState::Toggled
            && !script.contains(&output)
            && session.revert_mode_switch().await
        {
            info!("No {} text after switch, flipped it back", script.name);
            if let Some((kind, text)) = self
                .scan_candidates(session.page(), timeouts.candidate_retry_read)
                .await
            {
                output = text;
                provenance = Provenance::Compensated(kind);
            }
        }

        info!(
            "Final output for input: {}... -> {}",
            preview(input, 50),
            preview(&output, 100)
        );

        Ok(ProbeResult {
            output,
            provenance,
            input: input_kind,
            submit_duration,
            toggle_clicks: session.toggle_clicks(),
        })
    }

    /// Walk the input strategies, each with its own bounded wait
    async fn locate_input<P: PageDriver>(
        &self,
        session: &Session<P>,
    ) -> HarnessResult<(InputKind, Locator)> {
        let strategies = locator::input_strategies(session.target(), session.timeouts());
        let mut tried = Vec::with_capacity(strategies.len());

        for strategy in strategies {
            match session
                .page()
                .wait_visible(&strategy.locator, strategy.wait)
                .await
            {
                Ok(()) => {
                    debug!("Input located by {}", strategy.locator);
                    return Ok((strategy.kind, strategy.locator));
                }
                Err(e) => {
                    debug!("Input strategy {} failed: {}", strategy.locator, e);
                    tried.push(strategy.locator.to_string());
                }
            }
        }

        Err(HarnessError::InputNotFound { tried })
    }

    /// First candidate whose trimmed text is non-empty and carries target script
    async fn scan_candidates<P: PageDriver>(
        &self,
        page: &P,
        read_timeout: Duration,
    ) -> Option<(CandidateKind, String)> {
        let script = self.script();
        for candidate in &self.candidates {
            match page.inner_text(&candidate.locator, read_timeout).await {
                Ok(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() && script.contains(trimmed) {
                        debug!("Output captured from {}", candidate.kind);
                        return Some((candidate.kind, trimmed.to_string()));
                    }
                    debug!("Candidate {} has no {} text", candidate.kind, script.name);
                }
                Err(e) => debug!("Candidate {} failed: {}", candidate.kind, e),
            }
        }
        None
    }
}

/// First `max` characters of `text`
fn preview(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
