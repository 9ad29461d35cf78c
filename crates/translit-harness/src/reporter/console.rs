//! Console reporter for suite results
//!
//! Provides human-readable output with status indicators.

use anyhow::Result;
use std::fmt::Write;

use crate::probe::Provenance;
use crate::runner::{ScenarioResult, SuiteResults};

/// Console format reporter
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// Format suite results for console output
    pub fn format(results: &SuiteResults) -> Result<String> {
        let mut output = String::new();

        // Header
        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║                  CONVERSION SUITE RESULTS                     ║")?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;

        writeln!(output, "Target:    {}", results.target_url)?;
        writeln!(output, "Started:   {}", results.started_at)?;
        writeln!(output, "Duration:  {}ms", results.total_duration_ms)?;
        writeln!(
            output,
            "Scenarios: {} passed, {} failed",
            results.passed_count(),
            results.failed_count()
        )?;
        writeln!(output)?;

        for scenario in &results.scenario_results {
            Self::format_scenario(&mut output, scenario)?;
        }

        // Summary
        writeln!(output, "────────────────────────────────────────────────────────────────")?;
        let status = if results.passed { "PASSED" } else { "FAILED" };
        let status_symbol = if results.passed { "✓" } else { "✗" };
        writeln!(output, "Overall Status: {} {}", status_symbol, status)?;

        if !results.failures.is_empty() {
            writeln!(output)?;
            writeln!(output, "Failures:")?;
            for failure in &results.failures {
                writeln!(output, "  • {}", failure)?;
            }
        }

        writeln!(output)?;
        Ok(output)
    }

    fn format_scenario(output: &mut String, scenario: &ScenarioResult) -> Result<()> {
        let status = if scenario.passed { "✓" } else { "✗" };

        writeln!(output, "{} {} {}", status, scenario.id, scenario.name)?;
        writeln!(output, "    Input:    \"{}\"", scenario.input)?;
        match &scenario.output {
            Some(text) => writeln!(output, "    Output:   \"{}\"", text)?,
            None => writeln!(output, "    Output:   (none)")?,
        }
        if let Some(provenance) = &scenario.provenance {
            writeln!(output, "    Source:   {}", Self::describe(provenance))?;
        }
        if let Some(ms) = scenario.submit_duration_ms {
            writeln!(output, "    Response: {}ms", ms)?;
        }
        if scenario.attempts > 1 {
            writeln!(output, "    Attempts: {}", scenario.attempts)?;
        }
        if let Some(error) = &scenario.error {
            writeln!(output, "    Error:    {}", error)?;
        }
        for failure in &scenario.failures {
            writeln!(output, "    ✗ {}", failure)?;
        }
        Ok(())
    }

    fn describe(provenance: &Provenance) -> String {
        match provenance {
            Provenance::Candidate(kind) => kind.to_string(),
            Provenance::DocumentScan => "document scan".to_string(),
            Provenance::Compensated(kind) => format!("{} after reverting switch", kind),
            Provenance::Unresolved => "unresolved".to_string(),
        }
    }
}
