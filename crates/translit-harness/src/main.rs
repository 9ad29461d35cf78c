//! Conversion suite runner binary
//!
//! Usage: translit-harness <SUITE> [--format console|json|json-pretty] [--output FILE]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use translit_harness::config::Config;
use translit_harness::reporter::{OutputFormat, Reporter};
use translit_harness::runner::SuiteRunner;

#[derive(Parser, Debug)]
#[command(name = "translit-harness")]
#[command(version, about = "Run conversion scenarios against a browser-rendered transliterator")]
struct Args {
    /// Suite configuration file (TOML)
    suite: PathBuf,

    /// Report format: console, json or json-pretty
    #[arg(short, long, default_value = "console")]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only run scenarios whose id or name contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Override the number of concurrent tabs
    #[arg(long)]
    parallel: Option<u32>,

    /// Override the number of retries per failing scenario
    #[arg(long)]
    retries: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr so reports on stdout stay parseable
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_file(&args.suite)?;
    if let Some(filter) = &args.filter {
        let needle = filter.to_lowercase();
        config.scenarios.retain(|s| {
            s.id.to_lowercase().contains(&needle) || s.name.to_lowercase().contains(&needle)
        });
    }
    if args.headed {
        config.run.headless = false;
    }
    if let Some(parallel) = args.parallel {
        anyhow::ensure!(parallel > 0, "--parallel must be at least 1");
        config.run.parallel_contexts = parallel;
    }
    if let Some(retries) = args.retries {
        config.run.retries = retries;
    }

    tracing::info!(
        "Loaded {} scenarios from {}",
        config.scenarios.len(),
        args.suite.display()
    );

    let runner = SuiteRunner::new(config.run.headless).await?;
    let results = runner.run(&config).await;
    runner.close().await;
    let results = results?;

    let reporter = Reporter::new(args.format);
    match &args.output {
        Some(path) => reporter
            .write_to_file(&results, path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?,
        None => reporter.report(&results)?,
    }

    Ok(if results.passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
