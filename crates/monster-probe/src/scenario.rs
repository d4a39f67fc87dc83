//! Scenarios and the suite runner.
//!
//! Three scenarios exercise the monster page. Each starts from a fresh
//! `visit()`, logs its steps through `tracing` and a [`RunListener`], and
//! ends as a [`ScenarioResult`]. The [`SuiteRunner`] runs a selection of
//! them sequentially against one page object.

use crate::driver::ProbeDriver;
use crate::fixture::MonsterFixture;
use crate::page_object::MonsterPage;
use crate::report;
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::{error, info, info_span, Instrument};

/// Suite name used in logs and reports
pub const SUITE_NAME: &str = "Monster Creation, Verification, and Deletion";

/// The scenarios of the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Create, verify and delete every fixture monster
    Crud,
    /// Empty submit shows the required-fields alert
    RequiredFields,
    /// Non-numeric stats show the numeric alert
    NumericValidation,
}

impl ScenarioKind {
    /// All scenarios in suite order
    pub const ALL: [Self; 3] = [Self::Crud, Self::RequiredFields, Self::NumericValidation];

    /// Short name used on the command line and in file names
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Crud => "crud",
            Self::RequiredFields => "required-fields",
            Self::NumericValidation => "numeric-validation",
        }
    }

    /// Descriptive title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Crud => "should create, verify, and delete monsters",
            Self::RequiredFields => {
                "should show validation message when trying to create monster without required fields"
            }
            Self::NumericValidation => {
                "should show error when entering non-numeric values in numeric fields"
            }
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|k| k.name()).collect();
                ProbeError::config(format!(
                    "unknown scenario {s:?} (expected one of: {})",
                    known.join(", ")
                ))
            })
    }
}

/// Callbacks for scenario progress
pub trait RunListener {
    /// A scenario is about to run
    fn on_scenario_start(&mut self, _kind: ScenarioKind, _position: usize, _total: usize) {}

    /// A scenario logged a step
    fn on_step(&mut self, _kind: ScenarioKind, _step: &str) {}

    /// A scenario finished
    fn on_scenario_finish(&mut self, _result: &ScenarioResult) {}
}

/// Listener that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl RunListener for NoopListener {}

/// Result of running a single scenario
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Which scenario
    pub kind: ScenarioKind,
    /// Whether it passed
    pub passed: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Whether the failure was an assertion rather than a broken run
    pub assertion_failure: bool,
    /// Steps logged, in order
    pub steps: Vec<String>,
    /// Failure screenshot, if one was written
    pub screenshot: Option<PathBuf>,
    /// Scenario duration
    pub duration: Duration,
}

impl ScenarioResult {
    /// Create a passing result
    #[must_use]
    pub const fn pass(kind: ScenarioKind, steps: Vec<String>) -> Self {
        Self {
            kind,
            passed: true,
            error: None,
            assertion_failure: false,
            steps,
            screenshot: None,
            duration: Duration::ZERO,
        }
    }

    /// Create a failing result
    #[must_use]
    pub fn fail(kind: ScenarioKind, steps: Vec<String>, error: &ProbeError) -> Self {
        Self {
            kind,
            passed: false,
            error: Some(error.to_string()),
            assertion_failure: error.is_assertion(),
            steps,
            screenshot: None,
            duration: Duration::ZERO,
        }
    }

    /// Set duration
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// Results from running the suite
#[derive(Debug, Clone)]
pub struct SuiteResults {
    /// Suite name
    pub suite_name: String,
    /// Individual results in run order
    pub results: Vec<ScenarioResult>,
    /// Total duration
    pub duration: Duration,
}

impl SuiteResults {
    /// Check if all scenarios passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| !r.passed).count()
    }

    /// Number of scenarios run
    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Failed scenarios
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Step log handed to a running scenario
struct Steps<'a> {
    kind: ScenarioKind,
    log: Vec<String>,
    listener: &'a mut dyn RunListener,
}

impl Steps<'_> {
    fn step(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(scenario = %self.kind, "{message}");
        self.listener.on_step(self.kind, &message);
        self.log.push(message);
    }
}

async fn crud<D>(
    page: &MonsterPage<D>,
    fixture: &MonsterFixture,
    steps: &mut Steps<'_>,
) -> ProbeResult<()>
where
    D: ProbeDriver + ?Sized,
{
    steps.step("Step 1: Verifying initial empty state with \"no monsters\" message");
    page.verify_empty_state().await?;

    steps.step("Step 2: Creating multiple monsters with different attributes");
    for monster in fixture.iter() {
        steps.step(format!("Creating monster: {}", monster.summary()));
        let before = page.monster_count().await?;
        page.create_monster(monster).await?;
        page.verify_monster_count(before + 1).await?;
    }

    steps.step("Step 3: Verifying all monsters were created successfully");
    page.verify_monster_count(fixture.len()).await?;
    for (index, monster) in fixture.iter().enumerate() {
        steps.step(format!("Verifying monster {}: {}", index + 1, monster.name));
        page.verify_monster(monster, index).await?;
    }

    steps.step("Step 4: Cleaning up by deleting all monsters");
    page.delete_all_monsters().await?;

    steps.step("Step 5: Verifying all monsters were deleted successfully");
    page.verify_monster_count(0).await?;
    page.verify_empty_state().await
}

async fn required_fields<D>(page: &MonsterPage<D>, steps: &mut Steps<'_>) -> ProbeResult<()>
where
    D: ProbeDriver + ?Sized,
{
    steps.step("Step 1: Attempting to create a monster without filling required fields");
    page.verify_required_fields_alert().await?;
    steps.step("Step 2: Verifying validation message is displayed");
    Ok(())
}

async fn numeric_validation<D>(page: &MonsterPage<D>, steps: &mut Steps<'_>) -> ProbeResult<()>
where
    D: ProbeDriver + ?Sized,
{
    steps.step("Step 1: Attempting to create a monster with non-numeric values in numeric fields");
    page.verify_numeric_field_validation().await?;
    steps.step("Step 2: Verifying numeric validation error message is displayed");
    Ok(())
}

/// Runs a selection of scenarios against one page
#[derive(Debug, Clone)]
pub struct SuiteRunner {
    scenarios: Vec<ScenarioKind>,
    fail_fast: bool,
    screenshot_dir: Option<PathBuf>,
}

impl Default for SuiteRunner {
    fn default() -> Self {
        Self::new(ScenarioKind::ALL.to_vec())
    }
}

impl SuiteRunner {
    /// Create a runner for `scenarios`, run in the given order
    #[must_use]
    pub const fn new(scenarios: Vec<ScenarioKind>) -> Self {
        Self {
            scenarios,
            fail_fast: false,
            screenshot_dir: None,
        }
    }

    /// Stop after the first failed scenario
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Write a screenshot to `dir/<scenario>.png` when a scenario fails
    #[must_use]
    pub fn with_screenshots(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = Some(dir.into());
        self
    }

    /// Scenarios this runner will execute
    #[must_use]
    pub fn scenarios(&self) -> &[ScenarioKind] {
        &self.scenarios
    }

    /// Run one scenario, `visit()` first
    pub async fn run_scenario<D>(
        &self,
        kind: ScenarioKind,
        page: &MonsterPage<D>,
        fixture: &MonsterFixture,
        listener: &mut dyn RunListener,
    ) -> ScenarioResult
    where
        D: ProbeDriver + ?Sized,
    {
        let start = Instant::now();
        let mut steps = Steps {
            kind,
            log: Vec::new(),
            listener,
        };

        let outcome = async {
            steps.step("Navigating to the monster creation page");
            page.visit().await?;
            match kind {
                ScenarioKind::Crud => crud(page, fixture, &mut steps).await,
                ScenarioKind::RequiredFields => required_fields(page, &mut steps).await,
                ScenarioKind::NumericValidation => numeric_validation(page, &mut steps).await,
            }
        }
        .instrument(info_span!("scenario", name = kind.name()))
        .await;

        let log = steps.log;
        let mut result = match outcome {
            Ok(()) => ScenarioResult::pass(kind, log),
            Err(e) => {
                error!(scenario = %kind, error = %e, "scenario failed");
                ScenarioResult::fail(kind, log, &e)
            }
        };

        if !result.passed {
            if let Some(dir) = &self.screenshot_dir {
                result.screenshot = capture(page, dir, kind).await;
            }
        }
        result.with_duration(start.elapsed())
    }

    /// Run every selected scenario
    pub async fn run<D>(
        &self,
        page: &MonsterPage<D>,
        fixture: &MonsterFixture,
        listener: &mut dyn RunListener,
    ) -> SuiteResults
    where
        D: ProbeDriver + ?Sized,
    {
        let start = Instant::now();
        let total = self.scenarios.len();
        let mut results = Vec::with_capacity(total);
        info!(suite = SUITE_NAME, total, "running suite");

        for (position, &kind) in self.scenarios.iter().enumerate() {
            listener.on_scenario_start(kind, position, total);
            let result = self.run_scenario(kind, page, fixture, listener).await;
            listener.on_scenario_finish(&result);
            let failed = !result.passed;
            results.push(result);
            if failed && self.fail_fast {
                info!(scenario = %kind, "fail-fast: skipping remaining scenarios");
                break;
            }
        }

        SuiteResults {
            suite_name: SUITE_NAME.to_string(),
            results,
            duration: start.elapsed(),
        }
    }
}

async fn capture<D>(page: &MonsterPage<D>, dir: &std::path::Path, kind: ScenarioKind) -> Option<PathBuf>
where
    D: ProbeDriver + ?Sized,
{
    let png = match page.driver().screenshot().await {
        Ok(png) => png,
        Err(e) => {
            error!(scenario = %kind, error = %e, "screenshot failed");
            return None;
        }
    };
    match report::save_screenshot(dir, kind.name(), &png) {
        Ok(path) => Some(path),
        Err(e) => {
            error!(scenario = %kind, error = %e, "could not write screenshot");
            None
        }
    }
}
