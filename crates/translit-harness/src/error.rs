//! Error types for the conversion harness
//!
//! Only two conditions are fatal for a scenario: the page never settles
//! ([`HarnessError::NavigationTimeout`]) and no input control can be found
//! ([`HarnessError::InputNotFound`]). Everything that goes wrong while looking
//! for output is a [`DriverError`] that the probe swallows and logs.

use std::time::Duration;
use thiserror::Error;

/// Failure of a single browser-level operation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DriverError {
    #[error("Timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Element not actionable: {0}")]
    NotActionable(String),

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Browser error: {0}")]
    Browser(String),
}

impl DriverError {
    pub fn timeout(what: impl Into<String>, timeout: Duration) -> Self {
        DriverError::Timeout {
            what: what.into(),
            timeout,
        }
    }
}

/// Session-level failure that ends a scenario
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Page at {url} did not settle within {timeout:?}")]
    NavigationTimeout { url: String, timeout: Duration },

    #[error("No input control found (tried: {})", tried.join(", "))]
    InputNotFound { tried: Vec<String> },

    #[error(transparent)]
    Driver(#[from] DriverError),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
