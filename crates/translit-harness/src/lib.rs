//! End-to-end harness for a browser-rendered Singlish-to-Sinhala converter
//!
//! The service is a third-party page that the harness does not control. It
//! drives a real Chrome tab, types an input string, and works out which
//! element holds the converted text, falling back through several detection
//! strategies when the UI does not look the way it is expected to.
//!
//! # Features
//!
//! - **Session driver**: navigate, wait for the page to settle, flip the
//!   optional mode switch
//! - **Conversion probe**: prioritized input and output locators, document
//!   scan fallback, one compensating toggle
//! - **Scenarios**: TOML suites of inputs with strict and loose expectations
//! - **Parallel execution**: one isolated tab per scenario, with retries
//! - **Reports**: console and JSON
//!
//! # Example
//!
//! ```no_run
//! use translit_harness::{Config, runner::SuiteRunner, reporter::{Reporter, OutputFormat}};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_file("suites/swift_translator.toml")?;
//!
//! let runner = SuiteRunner::new(config.run.headless).await?;
//! let results = runner.run(&config).await?;
//!
//! Reporter::new(OutputFormat::Console).report(&results)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [target]
//! url = "https://www.swifttranslator.com/"
//! source_language = "singlish"
//! target_language = "sinhala"
//! switch_label = "Switch Typing Language"
//!
//! [timeouts]
//! submit_settle = 4000
//! toggle_settle = 1500
//!
//! [run]
//! parallel_contexts = 4
//! retries = 2
//!
//! [[scenarios]]
//! id = "Pos_Fun_0010"
//! name = "Convert imperative command"
//! input = "vahaama enna"
//! expect = [{ type = "converts", phrases = ["වහාම", "එන්න"], min_length = 15 }]
//! ```

pub mod browser;
pub mod config;
pub mod error;
pub mod expectation;
pub mod locator;
pub mod page;
pub mod probe;
pub mod reporter;
pub mod runner;
pub mod script;
pub mod session;

// Re-export main types for convenience
pub use config::Config;
pub use error::{DriverError, HarnessError};
pub use page::{ChromePage, PageDriver};
pub use probe::{ConversionProbe, ProbeResult, Provenance};
pub use reporter::{OutputFormat, Reporter};
pub use runner::{ScenarioResult, SuiteResults, SuiteRunner};
pub use script::{ScriptExtractor, TargetScript, SINHALA};
pub use session::{Session, ToggleState};
