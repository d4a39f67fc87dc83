//! Result and error types for monster-probe.

use thiserror::Error;

/// Result type for monster-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while driving the monster page
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Driver feature not compiled in
    #[error("Driver unavailable: {message}")]
    DriverUnavailable {
        /// Error message
        message: String,
    },

    /// Low-level driver (CDP) failure
    #[error("Driver error during {action}: {message}")]
    Driver {
        /// Action that was being performed
        action: String,
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// No element at the requested position
    #[error("No element matching {selector} at index {index}")]
    ElementNotFound {
        /// Selector used
        selector: String,
        /// Zero-based position among matches
        index: usize,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for} (last observed: {last_observed})")]
    Timeout {
        /// Description of what was waited for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
        /// Last observed state
        last_observed: String,
    },

    /// Assertion failed
    #[error("Assertion failed on {selector}: expected {expected}, got {actual}")]
    AssertionFailed {
        /// Selector the assertion ran against
        selector: String,
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },

    /// The page kept rendering cards after the deletion guard was exhausted
    #[error("Deletion loop stalled: {remaining} card(s) still rendered after {attempts} attempt(s)")]
    DeletionStalled {
        /// Iterations performed
        attempts: usize,
        /// Cards still rendered
        remaining: usize,
    },

    /// Image request returned a non-200 status
    #[error("Image {url} returned HTTP {status}")]
    ImageStatus {
        /// Resolved image URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Image request could not be sent
    #[error("Image request to {url} failed: {message}")]
    ImageRequest {
        /// Resolved image URL
        url: String,
        /// Error message
        message: String,
    },

    /// URL could not be parsed or joined
    #[error("Invalid URL {url}: {message}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Error message
        message: String,
    },

    /// Fixture error (loading or validation)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a driver error
    #[must_use]
    pub fn driver(action: impl Into<String>, message: impl ToString) -> Self {
        Self::Driver {
            action: action.into(),
            message: message.to_string(),
        }
    }

    /// Create a fixture error
    #[must_use]
    pub fn fixture(message: impl Into<String>) -> Self {
        Self::Fixture {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error is a failed expectation rather than a broken run
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(
            self,
            Self::AssertionFailed { .. }
                | Self::Timeout { .. }
                | Self::DeletionStalled { .. }
                | Self::ImageStatus { .. }
        )
    }
}
