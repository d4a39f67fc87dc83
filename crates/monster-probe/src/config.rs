//! Run configuration (`monster-probe.yaml`).
//!
//! Every field has a default, so an empty file is a valid configuration.
//! Command-line flags are applied on top by the CLI.

use crate::driver::{DriverConfig, ProbeDriver};
use crate::locator::MonsterLocators;
use crate::page_object::{CardOrdering, MonsterPage, VisualExpectations, DEFAULT_DELETION_MARGIN};
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{ScenarioKind, SuiteRunner};
use crate::wait::{WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default page under test
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Default fixture location
pub const DEFAULT_FIXTURE: &str = "fixtures/monsters.json";

/// Default output directory for reports and screenshots
pub const DEFAULT_OUTPUT_DIR: &str = "target/monster-probe";

/// Command run once before the suite
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupCommand {
    /// Program to execute
    pub program: String,
    /// Arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

impl SetupCommand {
    /// Run the command to completion; a non-zero exit is an error
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot start or exits unsuccessfully
    pub async fn run(&self) -> ProbeResult<()> {
        tracing::info!(program = %self.program, args = ?self.args, "running setup command");
        let mut command = tokio::process::Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        let status = command
            .status()
            .await
            .map_err(|e| ProbeError::config(format!("setup command {:?}: {e}", self.program)))?;
        if status.success() {
            Ok(())
        } else {
            Err(ProbeError::config(format!(
                "setup command {:?} exited with {status}",
                self.program
            )))
        }
    }
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Page under test
    pub base_url: String,
    /// Fixture file
    pub fixture: PathBuf,
    /// Scenarios to run, in order
    pub scenarios: Vec<ScenarioKind>,
    /// Command run once before the suite
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup: Option<SetupCommand>,
    /// Wait budget per query in milliseconds
    pub timeout_ms: u64,
    /// Poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Extra deletion-loop iterations beyond the initial card count
    pub deletion_margin: usize,
    /// Record-to-card matching
    pub ordering: CardOrdering,
    /// Assert hover/click effects on affordance cards
    pub verify_affordance_effects: bool,
    /// Locator overrides
    pub locators: MonsterLocators,
    /// Expected CSS values
    pub visuals: VisualExpectations,
    /// Browser settings
    pub browser: DriverConfig,
    /// Directory for the report and screenshots
    pub output_dir: PathBuf,
    /// Save a screenshot when a scenario fails
    pub screenshot_on_failure: bool,
    /// Stop after the first failed scenario
    pub fail_fast: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            fixture: PathBuf::from(DEFAULT_FIXTURE),
            scenarios: ScenarioKind::ALL.to_vec(),
            setup: None,
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            deletion_margin: DEFAULT_DELETION_MARGIN,
            ordering: CardOrdering::default(),
            verify_affordance_effects: true,
            locators: MonsterLocators::default(),
            visuals: VisualExpectations::default(),
            browser: DriverConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            screenshot_on_failure: false,
            fail_fast: false,
        }
    }
}

impl RunConfig {
    /// Parse and validate YAML
    ///
    /// # Errors
    ///
    /// Returns error on malformed YAML or invalid values
    pub fn from_yaml(yaml: &str) -> ProbeResult<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| ProbeError::config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_yaml(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded run config");
        Ok(config)
    }

    /// Serialize to YAML
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Check values that serde cannot
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Config`] describing the first problem found
    pub fn validate(&self) -> ProbeResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ProbeError::config(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::config(format!(
                "base_url must be http(s), got {:?}",
                self.base_url
            )));
        }
        if self.scenarios.is_empty() {
            return Err(ProbeError::config("no scenarios selected"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.scenarios.iter().find(|k| !seen.insert(**k)) {
            return Err(ProbeError::config(format!("scenario {dup} selected twice")));
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be greater than 0"));
        }
        if self.poll_interval_ms > self.timeout_ms {
            return Err(ProbeError::config(format!(
                "poll_interval_ms ({}) exceeds timeout_ms ({})",
                self.poll_interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }

    /// Wait options from the timing fields
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            timeout_ms: self.timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
        }
    }

    /// Page object configured from this run config
    #[must_use]
    pub fn page<D: ProbeDriver + ?Sized>(&self, driver: Arc<D>) -> MonsterPage<D> {
        MonsterPage::new(driver, self.base_url.clone())
            .with_locators(self.locators.clone())
            .with_visuals(self.visuals.clone())
            .with_wait(self.wait_options())
            .with_deletion_margin(self.deletion_margin)
            .with_ordering(self.ordering)
            .with_affordance_effects(self.verify_affordance_effects)
    }

    /// Suite runner configured from this run config
    #[must_use]
    pub fn runner(&self) -> SuiteRunner {
        let runner = SuiteRunner::new(self.scenarios.clone()).with_fail_fast(self.fail_fast);
        if self.screenshot_on_failure {
            runner.with_screenshots(self.output_dir.clone())
        } else {
            runner
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::page_object::PageObject;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_empty_file_is_default() {
            let config = RunConfig::from_yaml("").unwrap();
            assert_eq!(config, RunConfig::default());
            assert_eq!(config.scenarios.len(), 3);
            assert_eq!(config.deletion_margin, 3);
        }

        #[test]
        fn test_partial_file() {
            let yaml = r#"
base_url: "http://127.0.0.1:8080/app/"
scenarios: [crud]
ordering: by-name
locators:
  monster_card: ".monster"
browser:
  headless: false
  sandbox: false
setup:
  program: npm
  args: [run, seed]
"#;
            let config = RunConfig::from_yaml(yaml).unwrap();
            assert_eq!(config.scenarios, vec![ScenarioKind::Crud]);
            assert_eq!(config.ordering, CardOrdering::ByName);
            assert_eq!(config.locators.monster_card, ".monster");
            assert_eq!(
                config.locators.delete_button,
                MonsterLocators::default().delete_button
            );
            assert!(!config.browser.headless);
            assert_eq!(config.browser.viewport_width, 1280);
            assert_eq!(config.setup.unwrap().args, vec!["run", "seed"]);
        }

        #[test]
        fn test_unknown_key_rejected() {
            assert!(matches!(
                RunConfig::from_yaml("base_ulr: http://x/\n"),
                Err(ProbeError::Yaml(_))
            ));
        }

        #[test]
        fn test_yaml_output_parses_back() {
            let config = RunConfig::default();
            let yaml = config.to_yaml().unwrap();
            assert!(yaml.contains("http://localhost:3000/"));
            assert_eq!(RunConfig::from_yaml(&yaml).unwrap(), config);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_bad_base_url() {
            let err = RunConfig::from_yaml("base_url: localhost\n").unwrap_err();
            assert!(err.to_string().contains("base_url"));
            assert!(RunConfig::from_yaml("base_url: \"ftp://x/\"\n").is_err());
        }

        #[test]
        fn test_duplicate_scenario() {
            let err = RunConfig::from_yaml("scenarios: [crud, crud]\n").unwrap_err();
            assert!(err.to_string().contains("selected twice"));
        }

        #[test]
        fn test_empty_scenarios() {
            assert!(RunConfig::from_yaml("scenarios: []\n").is_err());
        }

        #[test]
        fn test_poll_interval_bounds() {
            assert!(RunConfig::from_yaml("poll_interval_ms: 0\n").is_err());
            assert!(RunConfig::from_yaml("timeout_ms: 10\npoll_interval_ms: 20\n").is_err());
        }

        #[test]
        fn test_load_missing() {
            let err = RunConfig::load(Path::new("/nonexistent/monster-probe.yaml")).unwrap_err();
            assert!(matches!(err, ProbeError::Config { .. }));
        }
    }

    mod build_tests {
        use super::*;
        use crate::fake_app::FakeMonsterApp;

        #[test]
        fn test_page_uses_config() {
            let config = RunConfig {
                base_url: "http://127.0.0.1:9/".to_string(),
                timeout_ms: 100,
                ..RunConfig::default()
            };
            let page = config.page(Arc::new(FakeMonsterApp::default()));
            assert_eq!(page.url(), "http://127.0.0.1:9/");
            assert_eq!(page.wait_options().timeout_ms, 100);
        }

        #[test]
        fn test_runner_uses_config() {
            let config = RunConfig {
                scenarios: vec![ScenarioKind::NumericValidation],
                ..RunConfig::default()
            };
            assert_eq!(config.runner().scenarios(), &[ScenarioKind::NumericValidation]);
        }

        #[tokio::test]
        async fn test_setup_command_failure() {
            let setup = SetupCommand {
                program: "definitely-not-a-real-program-xyz".to_string(),
                args: vec![],
                working_dir: None,
            };
            assert!(setup.run().await.is_err());
        }
    }
}
