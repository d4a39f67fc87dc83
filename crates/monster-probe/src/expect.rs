//! Retrying assertions over a live page.
//!
//! An [`ExpectAssertion`] is built from a [`Locator`] with [`expect`], then
//! either validated against an [`Observation`] synchronously or checked
//! against a live driver with [`ExpectAssertion::check`], which re-observes
//! the page until the assertion holds or the wait budget runs out.

use crate::driver::ProbeDriver;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::{poll_until, Attempt, WaitOptions};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Assertion builder for a locator
#[derive(Debug, Clone)]
pub struct Expect {
    locator: Locator,
}

impl Expect {
    /// Create a new expectation for a locator
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self { locator }
    }

    /// Assert the element has exactly this text
    pub fn to_have_text(&self, expected: impl Into<String>) -> ExpectAssertion {
        ExpectAssertion::HasText {
            locator: self.locator.clone(),
            expected: expected.into(),
        }
    }

    /// Assert an attribute value
    pub fn to_have_attribute(
        &self,
        name: impl Into<String>,
        expected: impl Into<String>,
    ) -> ExpectAssertion {
        ExpectAssertion::HasAttribute {
            locator: self.locator.clone(),
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// Assert a computed CSS value
    pub fn to_have_css(
        &self,
        property: impl Into<String>,
        expected: impl Into<String>,
    ) -> ExpectAssertion {
        ExpectAssertion::HasCss {
            locator: self.locator.clone(),
            property: property.into(),
            expected: expected.into(),
        }
    }

    /// Assert a computed CSS value is anything but `value`
    pub fn not_to_have_css(
        &self,
        property: impl Into<String>,
        value: impl Into<String>,
    ) -> ExpectAssertion {
        ExpectAssertion::NotHasCss {
            locator: self.locator.clone(),
            property: property.into(),
            value: value.into(),
        }
    }

    /// Assert the number of elements matching the selector
    pub fn to_have_count(&self, count: usize) -> ExpectAssertion {
        ExpectAssertion::HasCount {
            locator: self.locator.clone(),
            expected: count,
        }
    }

    /// Assert the element is visible
    pub fn to_be_visible(&self) -> ExpectAssertion {
        ExpectAssertion::IsVisible {
            locator: self.locator.clone(),
        }
    }

    /// Assert the element is enabled
    pub fn to_be_enabled(&self) -> ExpectAssertion {
        ExpectAssertion::IsEnabled {
            locator: self.locator.clone(),
        }
    }
}

/// Create an expectation for a locator
#[must_use]
pub const fn expect(locator: Locator) -> Expect {
    Expect::new(locator)
}

/// Assertion types for [`expect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectAssertion {
    /// Element has exact text
    HasText {
        /// The locator
        locator: Locator,
        /// Expected text
        expected: String,
    },
    /// Element attribute equals a value
    HasAttribute {
        /// The locator
        locator: Locator,
        /// Attribute name
        name: String,
        /// Expected value
        expected: String,
    },
    /// Computed style equals a value
    HasCss {
        /// The locator
        locator: Locator,
        /// CSS property
        property: String,
        /// Expected value
        expected: String,
    },
    /// Computed style differs from a value
    NotHasCss {
        /// The locator
        locator: Locator,
        /// CSS property
        property: String,
        /// Value that must not be present
        value: String,
    },
    /// Element count matches
    HasCount {
        /// The locator (index ignored)
        locator: Locator,
        /// Expected count
        expected: usize,
    },
    /// Element is visible
    IsVisible {
        /// The locator
        locator: Locator,
    },
    /// Element is enabled
    IsEnabled {
        /// The locator
        locator: Locator,
    },
}

/// What the page showed for one assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// No element at the locator's position
    Missing,
    /// Text, attribute or style value; `None` for an absent attribute
    Value(Option<String>),
    /// Match count
    Count(usize),
    /// Visibility or enabled flag
    Flag(bool),
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("no element"),
            Self::Value(Some(v)) => write!(f, "{v:?}"),
            Self::Value(None) => f.write_str("no value"),
            Self::Count(n) => write!(f, "count {n}"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

fn whitespace() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*,\s*|\s+").ok()).as_ref()
}

/// Normalize a CSS value for comparison: trimmed, single spaces, `", "`
/// between list and function arguments.
#[must_use]
pub fn normalize_css(value: &str) -> String {
    let trimmed = value.trim();
    match whitespace() {
        Some(re) => re
            .replace_all(trimmed, |caps: &regex::Captures<'_>| {
                if caps[0].contains(',') {
                    ", "
                } else {
                    " "
                }
            })
            .into_owned(),
        None => trimmed.to_string(),
    }
}

impl ExpectAssertion {
    /// The locator this assertion targets
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        match self {
            Self::HasText { locator, .. }
            | Self::HasAttribute { locator, .. }
            | Self::HasCss { locator, .. }
            | Self::NotHasCss { locator, .. }
            | Self::HasCount { locator, .. }
            | Self::IsVisible { locator }
            | Self::IsEnabled { locator } => locator,
        }
    }

    /// Human description of the expected state
    #[must_use]
    pub fn expected(&self) -> String {
        match self {
            Self::HasText { expected, .. } => format!("text {expected:?}"),
            Self::HasAttribute { name, expected, .. } => format!("{name}={expected:?}"),
            Self::HasCss {
                property, expected, ..
            } => format!("{property}: {expected}"),
            Self::NotHasCss { property, value, .. } => format!("{property} other than {value}"),
            Self::HasCount { expected, .. } => format!("count {expected}"),
            Self::IsVisible { .. } => "visible".to_string(),
            Self::IsEnabled { .. } => "enabled".to_string(),
        }
    }

    /// Validate an observation
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionFailed`] if the observation does not
    /// satisfy the assertion
    pub fn validate(&self, observed: &Observation) -> ProbeResult<()> {
        let holds = match (self, observed) {
            (Self::HasText { expected, .. }, Observation::Value(Some(actual)))
            | (Self::HasAttribute { expected, .. }, Observation::Value(Some(actual))) => {
                actual == expected
            }
            (Self::HasCss { expected, .. }, Observation::Value(Some(actual))) => {
                normalize_css(actual) == normalize_css(expected)
            }
            (Self::NotHasCss { value, .. }, Observation::Value(Some(actual))) => {
                normalize_css(actual) != normalize_css(value)
            }
            (Self::HasCount { expected, .. }, Observation::Count(actual)) => actual == expected,
            (Self::IsVisible { .. } | Self::IsEnabled { .. }, Observation::Flag(flag)) => *flag,
            _ => false,
        };

        if holds {
            Ok(())
        } else {
            Err(self.failure(observed.to_string()))
        }
    }

    fn failure(&self, actual: String) -> ProbeError {
        ProbeError::AssertionFailed {
            selector: self.locator().to_string(),
            expected: self.expected(),
            actual,
        }
    }

    /// Read the current state from the page
    ///
    /// # Errors
    ///
    /// Returns driver errors
    pub async fn observe<D>(&self, driver: &D) -> ProbeResult<Observation>
    where
        D: ProbeDriver + ?Sized,
    {
        let locator = self.locator();
        let (selector, index) = (locator.selector(), locator.index());

        if let Self::HasCount { .. } = self {
            return Ok(Observation::Count(driver.count(selector).await?));
        }
        if driver.count(selector).await? <= index {
            return Ok(Observation::Missing);
        }

        let observed = match self {
            Self::HasText { .. } => Observation::Value(driver.text(selector, index).await?),
            Self::HasAttribute { name, .. } => {
                Observation::Value(driver.attribute(selector, index, name).await?)
            }
            Self::HasCss { property, .. } | Self::NotHasCss { property, .. } => {
                Observation::Value(driver.computed_style(selector, index, property).await?)
            }
            Self::IsVisible { .. } => Observation::Flag(driver.is_visible(selector, index).await?),
            Self::IsEnabled { .. } => Observation::Flag(driver.is_enabled(selector, index).await?),
            Self::HasCount { .. } => Observation::Count(driver.count(selector).await?),
        };
        Ok(observed)
    }

    /// Re-observe until the assertion holds.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::AssertionFailed`] with the last observation when
    /// the wait budget runs out, or driver errors
    pub async fn check<D>(&self, driver: &D, options: &WaitOptions) -> ProbeResult<()>
    where
        D: ProbeDriver + ?Sized,
    {
        let waited_for = format!("{} to have {}", self.locator(), self.expected());
        let result = poll_until(&waited_for, options, move || async move {
            let observed = self.observe(driver).await?;
            Ok(match self.validate(&observed) {
                Ok(()) => Attempt::Ready(()),
                Err(_) => Attempt::Pending(observed.to_string()),
            })
        })
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(ProbeError::Timeout { last_observed, .. }) => Err(self.failure(last_observed)),
            Err(e) => Err(e),
        }
    }
}
