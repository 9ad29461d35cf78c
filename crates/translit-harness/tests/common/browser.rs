//! Browser automation helpers

#![allow(dead_code)]

use anyhow::Result;
use chromiumoxide::browser::Browser;
use translit_harness::browser::BrowserTask;
use std::time::Duration;

/// Check if browser tests should be skipped (when Chrome isn't available)
pub fn should_skip() -> bool {
    std::env::var("SKIP_BROWSER_TESTS").is_ok()
}

/// Macro to skip test if Chrome isn't available
#[macro_export]
macro_rules! skip_if_no_chrome {
    () => {
        if browser::should_skip() {
            eprintln!("Skipping test: SKIP_BROWSER_TESTS is set");
            return;
        }
    };
}

/// Helper to create a headless browser for testing
pub async fn create_test_browser() -> Result<(Browser, BrowserTask)> {
    let launched = translit_harness::browser::launch(true).await?;

    // Give browser a moment to fully initialize
    tokio::time::sleep(Duration::from_millis(500)).await;

    Ok(launched)
}

/// Try to create browser, skip test if Chrome not found
pub async fn require_browser() -> Option<(Browser, BrowserTask)> {
    match create_test_browser().await {
        Ok(browser) => Some(browser),
        Err(e) => {
            let message = format!("{:#}", e);
            if message.contains("Could not auto detect") {
                eprintln!("Skipping: Chrome not installed ({})", message);
                None
            } else {
                panic!("Unexpected browser error: {}", message);
            }
        }
    }
}

/// Inline an HTML fixture as a `data:` URL
pub fn data_url(html: &str) -> String {
    let mut url = String::from("data:text/html;charset=utf-8,");
    for byte in html.bytes() {
        if byte.is_ascii_alphanumeric() || b"-_.!~*'()".contains(&byte) {
            url.push(byte as char);
        } else {
            url.push_str(&format!("%{:02X}", byte));
        }
    }
    url
}
