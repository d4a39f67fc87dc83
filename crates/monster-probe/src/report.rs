//! Run reports and failure screenshots.

use crate::result::ProbeResult;
use crate::scenario::{ScenarioKind, ScenarioResult, SuiteResults};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the JSON report inside the output directory
pub const REPORT_FILE: &str = "report.json";

/// Scenario outcome in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Scenario passed
    Passed,
    /// Scenario failed
    Failed,
    /// Scenario was selected but not run (fail-fast)
    Skipped,
}

impl ScenarioStatus {
    /// Check if status is passing
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// One scenario in a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioEntry {
    /// Short scenario name
    pub name: String,
    /// Descriptive title
    pub title: String,
    /// Outcome
    pub status: ScenarioStatus,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Error message if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Logged steps
    pub steps: Vec<String>,
    /// Failure screenshot path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl ScenarioEntry {
    fn from_result(result: &ScenarioResult) -> Self {
        Self {
            name: result.kind.name().to_string(),
            title: result.kind.title().to_string(),
            status: if result.passed {
                ScenarioStatus::Passed
            } else {
                ScenarioStatus::Failed
            },
            duration_ms: millis(result.duration),
            error: result.error.clone(),
            steps: result.steps.clone(),
            screenshot: result.screenshot.clone(),
        }
    }

    fn skipped(kind: ScenarioKind) -> Self {
        Self {
            name: kind.name().to_string(),
            title: kind.title().to_string(),
            status: ScenarioStatus::Skipped,
            duration_ms: 0,
            error: None,
            steps: Vec::new(),
            screenshot: None,
        }
    }
}

/// Machine-readable summary of a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Suite name
    pub suite: String,
    /// Page the suite ran against
    pub base_url: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Total duration in milliseconds
    pub duration_ms: u64,
    /// Passed scenarios
    pub passed: usize,
    /// Failed scenarios
    pub failed: usize,
    /// Skipped scenarios
    pub skipped: usize,
    /// Per-scenario entries in selection order
    pub scenarios: Vec<ScenarioEntry>,
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

impl SuiteReport {
    /// Build a report; selected scenarios without a result are marked skipped
    #[must_use]
    pub fn new(
        results: &SuiteResults,
        selected: &[ScenarioKind],
        base_url: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut scenarios: Vec<ScenarioEntry> =
            results.results.iter().map(ScenarioEntry::from_result).collect();
        scenarios.extend(
            selected
                .iter()
                .filter(|k| !results.results.iter().any(|r| r.kind == **k))
                .map(|&k| ScenarioEntry::skipped(k)),
        );

        Self {
            suite: results.suite_name.clone(),
            base_url: base_url.into(),
            started_at,
            duration_ms: millis(results.duration),
            passed: results.passed_count(),
            failed: results.failed_count(),
            skipped: scenarios.len() - results.total(),
            scenarios,
        }
    }

    /// Whether every selected scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.scenarios.iter().all(|s| s.status.is_passed())
    }

    /// One-line summary
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{}: {} passed, {} failed, {} skipped ({} ms)",
            self.suite, self.passed, self.failed, self.skipped, self.duration_ms
        )
    }

    /// Pretty JSON
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `report.json` into `dir`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be written
    pub fn write(&self, dir: &Path) -> ProbeResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(REPORT_FILE);
        std::fs::write(&path, self.to_json()?)?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }
}

/// Write `png` to `dir/<name>.png`, creating `dir` if needed
///
/// # Errors
///
/// Returns error if the directory or file cannot be written
pub fn save_screenshot(dir: &Path, name: &str, png: &[u8]) -> ProbeResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.png"));
    std::fs::write(&path, png)?;
    tracing::info!(path = %path.display(), bytes = png.len(), "screenshot saved");
    Ok(path)
}
