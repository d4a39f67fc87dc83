//! monster-probe: page-object browser tests for the monster CRUD page.
//!
//! The suite drives a browser through a small set of domain operations
//! (create a monster, verify its card, delete everything) and asserts the
//! page's validation messages and visual states.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  monster-probe Architecture                     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ Scenario   │    │ MonsterPage│    │ ProbeDriver        │    │
//! │   │ (crud,     │───►│ (page      │───►│  ChromiumDriver    │    │
//! │   │ validation)│    │  object)   │    │  FakeMonsterApp    │    │
//! │   └────────────┘    └────────────┘    └────────────────────┘    │
//! │         ▲                 │                                     │
//! │   MonsterFixture    MonsterLocators                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use monster_probe::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> ProbeResult<()> {
//! let fixture = MonsterFixture::load("fixtures/monsters.json".as_ref())?;
//! let page = MonsterPage::new(Arc::new(FakeMonsterApp::default()), "http://localhost:3000/");
//! let results = SuiteRunner::default()
//!     .run(&page, &fixture, &mut NoopListener)
//!     .await;
//! assert!(results.all_passed());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

#[cfg(feature = "browser")]
mod chromium;
mod config;
mod driver;
mod expect;
mod fake_app;
mod fixture;
mod image;
mod locator;
#[allow(clippy::missing_errors_doc)]
mod page_object;
mod report;
mod result;
#[allow(clippy::missing_errors_doc)]
mod scenario;
mod wait;

#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver;
pub use config::{
    RunConfig, SetupCommand, DEFAULT_BASE_URL, DEFAULT_FIXTURE, DEFAULT_OUTPUT_DIR,
};
pub use driver::{DriverConfig, ProbeDriver};
pub use expect::{expect, normalize_css, Expect, ExpectAssertion, Observation};
pub use fake_app::{FakeAppOptions, FakeFaults, FakeMonsterApp, POPULATED_TITLE};
pub use fixture::{MonsterFixture, MonsterRecord};
pub use image::ImageProbe;
pub use locator::{Locator, MonsterLocators, NumericField, Selector};
pub use page_object::{
    CardOrdering, MonsterPage, PageObject, VisualExpectations, DEFAULT_DELETION_MARGIN,
    EMPTY_TITLE, INVALID_NUMERIC_VALUE, NUMERIC_FIELD_MESSAGE, REQUIRED_FIELDS_MESSAGE,
};
pub use report::{save_screenshot, ScenarioEntry, ScenarioStatus, SuiteReport, REPORT_FILE};
pub use result::{ProbeError, ProbeResult};
pub use scenario::{
    NoopListener, RunListener, ScenarioKind, ScenarioResult, SuiteResults, SuiteRunner,
    SUITE_NAME,
};
pub use wait::{
    poll_until, Attempt, WaitOptions, WaitResult, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};

/// Whether the Chromium driver was compiled in
#[must_use]
pub const fn browser_available() -> bool {
    cfg!(feature = "browser")
}

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::chromium::*;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::expect::*;
    pub use super::fake_app::*;
    pub use super::fixture::*;
    pub use super::image::*;
    pub use super::locator::*;
    pub use super::page_object::*;
    pub use super::report::*;
    pub use super::result::*;
    pub use super::scenario::*;
    pub use super::wait::*;
}
