//! Reachability checks for the live service

#![allow(dead_code)]

/// Check if the service answers with a success status
pub async fn is_reachable(url: &str) -> bool {
    match reqwest::get(url).await {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

/// Macro to skip test if the live service can't be reached
#[macro_export]
macro_rules! require_live_target {
    ($url:expr) => {{
        if std::env::var("TRANSLIT_LIVE_TESTS").is_err() {
            eprintln!("Skipping: set TRANSLIT_LIVE_TESTS=1 to run against {}", $url);
            return;
        }
        if !server::is_reachable($url).await {
            eprintln!("Skipping: {} is not reachable", $url);
            return;
        }
    }};
}
