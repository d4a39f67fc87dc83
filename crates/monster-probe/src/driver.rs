//! ProbeDriver - the browser automation seam.
//!
//! The page object only ever talks to this trait. Two implementations ship
//! with the crate:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ProbeDriver (async trait)                                   │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────┐  ┌──────────────────────────┐  │
//! │  │  ChromiumDriver          │  │  FakeMonsterApp          │  │
//! │  │  (feature = "browser")   │  │  (in-memory page model)  │  │
//! │  │  CDP via chromiumoxide   │  │  used by tests / dry run │  │
//! │  └──────────────────────────┘  └──────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Elements are addressed by `(selector, index)`: the `index`-th match of a
//! CSS selector in document order. Queries return `None` when no element sits
//! at that position; actions fail with [`ProbeError::ElementNotFound`].

use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Browser configuration for drivers that launch a real browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Timeout for browser launch and navigation in milliseconds
    pub navigation_timeout_ms: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 800,
            chromium_path: None,
            sandbox: true,
            navigation_timeout_ms: 30_000,
        }
    }
}

impl DriverConfig {
    /// Create new config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set headless mode
    #[must_use]
    pub const fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Navigation timeout as Duration
    #[must_use]
    pub const fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

/// Abstract driver trait for browser automation.
///
/// All methods take `&self`; implementations keep their mutable state behind
/// interior mutability so a page object can hold the driver by value.
#[async_trait]
pub trait ProbeDriver: Send + Sync {
    /// Navigate to URL and wait for the load to finish
    async fn navigate(&self, url: &str) -> ProbeResult<()>;

    /// URL of the current document
    async fn current_url(&self) -> ProbeResult<String>;

    /// Number of elements matching `selector`
    async fn count(&self, selector: &str) -> ProbeResult<usize>;

    /// `textContent` of the element
    async fn text(&self, selector: &str, index: usize) -> ProbeResult<Option<String>>;

    /// Attribute value; `Ok(None)` when the element or the attribute is missing
    async fn attribute(
        &self,
        selector: &str,
        index: usize,
        name: &str,
    ) -> ProbeResult<Option<String>>;

    /// Computed CSS property value
    async fn computed_style(
        &self,
        selector: &str,
        index: usize,
        property: &str,
    ) -> ProbeResult<Option<String>>;

    /// Whether the element is rendered with a non-empty box
    async fn is_visible(&self, selector: &str, index: usize) -> ProbeResult<bool>;

    /// Whether the element is enabled (not `disabled`)
    async fn is_enabled(&self, selector: &str, index: usize) -> ProbeResult<bool>;

    /// Click the element
    async fn click(&self, selector: &str, index: usize) -> ProbeResult<()>;

    /// Fire `mouseover` on the element
    async fn hover(&self, selector: &str, index: usize) -> ProbeResult<()>;

    /// Type text into the element, appending to its current value
    async fn type_text(&self, selector: &str, index: usize, text: &str) -> ProbeResult<()>;

    /// Clear the element's value as a user would
    async fn clear(&self, selector: &str, index: usize) -> ProbeResult<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> ProbeResult<Vec<u8>>;

    /// Close the browser
    async fn close(&self) -> ProbeResult<()>;
}

/// Error for an action against a missing element
pub(crate) fn not_found(selector: &str, index: usize) -> ProbeError {
    ProbeError::ElementNotFound {
        selector: selector.to_string(),
        index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DriverConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert!(config.chromium_path.is_none());
        assert_eq!(config.navigation_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder() {
        let config = DriverConfig::new()
            .headless(false)
            .viewport(800, 600)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();

        assert!(!config.headless);
        assert_eq!(config.viewport_width, 800);
        assert_eq!(config.viewport_height, 600);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
        assert!(!config.sandbox);
    }

    #[test]
    fn test_not_found_error() {
        let err = not_found("[data-testid=\"btn-delete\"]", 0);
        assert!(err.to_string().contains("btn-delete"));
        assert!(err.to_string().contains("index 0"));
    }
}
