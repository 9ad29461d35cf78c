//! Live scenarios against https://www.swifttranslator.com/
//!
//! These hit the real service, so they only run when TRANSLIT_LIVE_TESTS is
//! set and the site answers.
//!
//! Run with: TRANSLIT_LIVE_TESTS=1 cargo test -p translit-harness --test browser_swift

#[path = "common/browser.rs"]
mod browser;
#[path = "common/paths.rs"]
mod paths;
#[path = "common/server.rs"]
mod server;

use translit_harness::config::Config;
use translit_harness::page::ChromePage;
use translit_harness::probe::ConversionProbe;
use translit_harness::runner::{execute_scenario, AttemptOutcome};
use translit_harness::SINHALA;

const TARGET_URL: &str = "https://www.swifttranslator.com/";

fn bundled_suite() -> Config {
    Config::from_file(paths::suite_path("swift_translator.toml")).expect("Should load bundled suite")
}

/// Run one bundled scenario in a fresh tab
async fn run_bundled(id: &str) -> Option<AttemptOutcome> {
    let (chrome, _handle) = browser::require_browser().await?;
    let config = bundled_suite();
    let scenario = config
        .scenarios
        .iter()
        .find(|s| s.id == id)
        .unwrap_or_else(|| panic!("{} missing from bundled suite", id));
    let probe = ConversionProbe::new(&config.target, SINHALA);

    let page = chrome
        .new_page("about:blank")
        .await
        .expect("Should create page");
    let (outcome, page) = execute_scenario(&config, &probe, scenario, ChromePage::new(page)).await;
    let _ = page.close().await;

    eprintln!(
        "{}: {:?}",
        id,
        outcome.probe.as_ref().map(|p| (&p.output, p.provenance))
    );
    Some(outcome)
}

fn assert_passed(outcome: &AttemptOutcome) {
    assert!(
        outcome.passed(),
        "error: {:?}, failures: {:?}",
        outcome.error,
        outcome.failures
    );
}

#[tokio::test]
async fn test_live_imperative_command() {
    skip_if_no_chrome!();
    require_live_target!(TARGET_URL);

    let Some(outcome) = run_bundled("Pos_Fun_0010").await else {
        return;
    };
    assert_passed(&outcome);
}

#[tokio::test]
async fn test_live_unit_of_measurement() {
    skip_if_no_chrome!();
    require_live_target!(TARGET_URL);

    let Some(outcome) = run_bundled("Pos_Fun_0009").await else {
        return;
    };
    assert_passed(&outcome);
    let output = outcome.probe.map(|p| p.output).unwrap_or_default();
    assert!(output.contains("2kg"), "got {:?}", output);
}

#[tokio::test]
async fn test_live_irregular_spacing() {
    skip_if_no_chrome!();
    require_live_target!(TARGET_URL);

    let Some(outcome) = run_bundled("Pos_Fun_0020").await else {
        return;
    };
    let output = outcome.probe.map(|p| p.output).unwrap_or_default();
    for phrase in ["මම", "ගෙදර", "ඉන්නේ"] {
        assert!(output.contains(phrase), "{} missing from {:?}", phrase, output);
    }
}

#[tokio::test]
async fn test_live_repetition_still_yields_script() {
    skip_if_no_chrome!();
    require_live_target!(TARGET_URL);

    let Some(outcome) = run_bundled("Neg_Fun_0009").await else {
        return;
    };
    assert_passed(&outcome);
    let output = outcome.probe.map(|p| p.output).unwrap_or_default();
    assert!(SINHALA.contains(&output));
}

#[tokio::test]
async fn test_live_embedded_sinhala_preserved() {
    skip_if_no_chrome!();
    require_live_target!(TARGET_URL);

    let Some(outcome) = run_bundled("Neg_Fun_0002").await else {
        return;
    };
    let output = outcome.probe.map(|p| p.output).unwrap_or_default();
    assert!(output.contains("සුනිල්"), "got {:?}", output);
}
