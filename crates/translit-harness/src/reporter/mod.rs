//! Suite result reporting
//!
//! This module formats suite results for people and for machines.
//!
//! # Output Formats
//!
//! - **JSON**: Machine-readable format for CI integration
//! - **Console**: Human-readable summary with per-scenario status
//!
//! # Example
//!
//! ```no_run
//! use translit_harness::reporter::{Reporter, OutputFormat};
//! use translit_harness::runner::SuiteResults;
//!
//! # fn example(results: SuiteResults) -> anyhow::Result<()> {
//! let reporter = Reporter::new(OutputFormat::Console);
//! reporter.report(&results)?;
//!
//! // Or write to a file
//! Reporter::new(OutputFormat::JsonPretty)
//!     .write_to_file(&results, "results.json")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::Result;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::runner::SuiteResults;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for suite results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// JSON format for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Console output
    #[default]
    Console,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "json-pretty" | "json_pretty" => Ok(OutputFormat::JsonPretty),
            "console" | "text" => Ok(OutputFormat::Console),
            other => Err(format!(
                "unknown format '{}', expected console, json or json-pretty",
                other
            )),
        }
    }
}

/// Reporter for suite results
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    /// Create a new reporter with the specified output format
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Report results to stdout
    pub fn report(&self, results: &SuiteResults) -> Result<()> {
        let output = self.format_results(results)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    /// Write results to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, results: &SuiteResults, path: P) -> Result<()> {
        let output = self.format_results(results)?;
        fs::write(path, output)?;
        Ok(())
    }

    /// Format results as a string
    pub fn format_results(&self, results: &SuiteResults) -> Result<String> {
        match self.format {
            OutputFormat::Json => JsonReporter::format(results, false),
            OutputFormat::JsonPretty => JsonReporter::format(results, true),
            OutputFormat::Console => ConsoleReporter::format(results),
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

#[cfg(test)]
pub(crate) fn sample_results() -> SuiteResults {
    use crate::locator::CandidateKind;
    use crate::probe::Provenance;
    use crate::runner::ScenarioResult;

    SuiteResults {
        target_url: "https://www.swifttranslator.com/".to_string(),
        scenario_results: vec![
            ScenarioResult {
                id: "Pos_Fun_0010".to_string(),
                name: "Convert imperative command".to_string(),
                input: "vahaama enna".to_string(),
                output: Some("වහාම එන්න".to_string()),
                provenance: Some(Provenance::Candidate(CandidateKind::ScriptText)),
                submit_duration_ms: Some(4020),
                toggle_clicks: 1,
                passed: true,
                failures: Vec::new(),
                error: None,
                attempts: 1,
                duration_ms: 7400,
            },
            ScenarioResult {
                id: "Neg_Fun_0001".to_string(),
                name: "Severe spelling errors".to_string(),
                input: "apigedhra ynavaa".to_string(),
                output: None,
                provenance: None,
                submit_duration_ms: None,
                toggle_clicks: 0,
                passed: false,
                failures: Vec::new(),
                error: Some("No input control found (tried: textarea >> nth=0)".to_string()),
                attempts: 2,
                duration_ms: 31000,
            },
        ],
        total_duration_ms: 38400,
        passed: false,
        failures: vec![
            "Neg_Fun_0001: No input control found (tried: textarea >> nth=0)".to_string(),
        ],
        started_at: "2024-01-01T00:00:00Z".to_string(),
    }
}
