//! `monster-probe run`: resolve the configuration, start a driver, run the
//! suite and write the report.

use crate::commands::{DriverArg, RunArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{OutputFormat, ProgressReporter};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use monster_probe::{
    FakeAppOptions, FakeMonsterApp, MonsterFixture, ProbeDriver, RunConfig, ScenarioKind,
    SuiteReport, SUITE_NAME,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Configuration file picked up from the working directory
pub const CONFIG_FILE: &str = "monster-probe.yaml";

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Load the run configuration and apply command-line overrides
///
/// # Errors
///
/// Returns error if the file is unreadable or the result is invalid
pub fn resolve_config(args: &RunArgs) -> CliResult<RunConfig> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, args);
    config.validate()?;
    Ok(config)
}

/// Explicit path, else `./monster-probe.yaml` when present, else defaults
///
/// # Errors
///
/// Returns error if the chosen file cannot be loaded
pub fn load_config(path: Option<&Path>) -> CliResult<RunConfig> {
    match path {
        Some(path) => Ok(RunConfig::load(path)?),
        None if Path::new(CONFIG_FILE).is_file() => Ok(RunConfig::load(Path::new(CONFIG_FILE))?),
        None => Ok(RunConfig::default()),
    }
}

/// Flags override file values
pub fn apply_overrides(config: &mut RunConfig, args: &RunArgs) {
    if let Some(ref url) = args.base_url {
        config.base_url.clone_from(url);
    }
    if let Some(ref fixture) = args.fixture {
        config.fixture.clone_from(fixture);
    }
    if !args.scenarios.is_empty() {
        config.scenarios = args.scenarios.iter().map(|&s| ScenarioKind::from(s)).collect();
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(ref path) = args.chromium_path {
        config.browser.chromium_path = Some(path.clone());
    }
    if args.no_sandbox {
        config.browser.sandbox = false;
    }
    if args.fail_fast {
        config.fail_fast = true;
    }
    if let Some(timeout) = args.timeout {
        config.timeout_ms = timeout;
        config.poll_interval_ms = config.poll_interval_ms.min(timeout.max(1));
    }
    if let Some(ref dir) = args.output_dir {
        config.output_dir.clone_from(dir);
    }
    if args.screenshots {
        config.screenshot_on_failure = true;
    }
}

/// Fixture records are only needed by the CRUD scenario
///
/// # Errors
///
/// Returns error if CRUD is selected and the fixture is missing or invalid
pub fn load_fixture(config: &RunConfig) -> CliResult<MonsterFixture> {
    if config.scenarios.contains(&ScenarioKind::Crud) {
        Ok(MonsterFixture::load(&config.fixture)?)
    } else {
        Ok(MonsterFixture::default())
    }
}

/// Where the run ended up
#[derive(Debug)]
pub struct RunOutcome {
    /// The written report
    pub report: SuiteReport,
    /// Path of `report.json`
    pub report_path: PathBuf,
}

impl RunOutcome {
    /// Whether every selected scenario passed
    #[must_use]
    pub fn success(&self) -> bool {
        self.report.all_passed()
    }
}

/// Runs the suite for the `run` command
#[derive(Debug)]
pub struct SuiteCommand {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl SuiteCommand {
    /// Create a command with presentation settings
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
                .with_steps(config.verbosity.is_verbose());
        Self { config, reporter }
    }

    /// Block on the suite in a fresh runtime
    ///
    /// # Errors
    ///
    /// Returns error if the suite could not be started; scenario failures are
    /// reported through the outcome instead
    pub fn run(self, args: &RunArgs) -> CliResult<RunOutcome> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| CliError::suite_execution(format!("cannot start runtime: {e}")))?;
        runtime.block_on(self.execute(args))
    }

    /// Run the suite on the current runtime
    ///
    /// # Errors
    ///
    /// Same as [`SuiteCommand::run`]
    pub async fn execute(mut self, args: &RunArgs) -> CliResult<RunOutcome> {
        let config = resolve_config(args)?;
        let fixture = load_fixture(&config)?;
        tracing::debug!(?config, "resolved run config");

        if let Some(ref setup) = config.setup {
            self.reporter.info(&format!("Setup: {}", setup.program));
            setup.run().await?;
        }

        let (driver, image_server) = build_driver(args.driver, &config, &fixture).await?;
        self.reporter.header(SUITE_NAME);
        self.reporter.info(&format!(
            "{} scenario(s) against {}",
            config.scenarios.len(),
            config.base_url
        ));

        let page = config.page(Arc::clone(&driver));
        let started_at = Utc::now();
        let results = config
            .runner()
            .run(&page, &fixture, &mut self.reporter)
            .await;
        self.reporter.finish();

        if let Err(e) = driver.close().await {
            warn!(error = %e, "driver did not close cleanly");
        }
        if let Some(server) = image_server {
            server.abort();
        }

        let report = SuiteReport::new(&results, &config.scenarios, &config.base_url, started_at);
        let report_path = report.write(&config.output_dir)?;
        info!(path = %report_path.display(), summary = %report.summary(), "report written");

        match OutputFormat::from(args.format) {
            OutputFormat::Text => {
                self.reporter.report_summary(&report);
                if !self.config.verbosity.is_quiet() {
                    self.reporter
                        .info(&format!("Report: {}", report_path.display()));
                }
            }
            OutputFormat::Json => println!("{}", report.to_json()?),
        }

        Ok(RunOutcome {
            report,
            report_path,
        })
    }
}

async fn build_driver(
    kind: DriverArg,
    config: &RunConfig,
    fixture: &MonsterFixture,
) -> CliResult<(Arc<dyn ProbeDriver>, Option<JoinHandle<()>>)> {
    match kind {
        #[cfg(feature = "browser")]
        DriverArg::Chromium => {
            let driver = monster_probe::ChromiumDriver::launch(config.browser.clone()).await?;
            Ok((Arc::new(driver), None))
        }
        #[cfg(not(feature = "browser"))]
        DriverArg::Chromium => Err(monster_probe::ProbeError::DriverUnavailable {
            message: "built without the `browser` feature; use --driver fake".to_string(),
        }
        .into()),
        DriverArg::Fake => {
            let (image_base_url, server) = serve_images().await?;
            let mut options = FakeAppOptions::default().with_image_base_url(image_base_url);
            options.locators = config.locators.clone();
            if !fixture.is_empty() {
                options = options.with_affordances(fixture.iter().map(|m| m.test_id.clone()));
            }
            info!("using in-memory monster page");
            Ok((Arc::new(FakeMonsterApp::new(options)), Some(server)))
        }
    }
}

async fn placeholder_image() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PNG_SIGNATURE)
}

/// Serve `/images/{file}` on an ephemeral port; returns the `/images` base URL
async fn serve_images() -> CliResult<(String, JoinHandle<()>)> {
    let app = Router::new().route("/images/{file}", get(placeholder_image));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "image server stopped");
        }
    });
    tracing::debug!(%addr, "serving placeholder images");
    Ok((format!("http://{addr}/images"), handle))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{OutputFormatArg, ScenarioArg};
    use crate::config::Verbosity;

    mod override_tests {
        use super::*;

        #[test]
        fn test_flags_override_defaults() {
            let args = RunArgs {
                base_url: Some("http://127.0.0.1:5173/".to_string()),
                scenarios: vec![ScenarioArg::NumericValidation],
                headed: true,
                no_sandbox: true,
                fail_fast: true,
                screenshots: true,
                output_dir: Some(PathBuf::from("out")),
                ..RunArgs::default()
            };
            let mut config = RunConfig::default();
            apply_overrides(&mut config, &args);
            assert_eq!(config.base_url, "http://127.0.0.1:5173/");
            assert_eq!(config.scenarios, vec![ScenarioKind::NumericValidation]);
            assert!(!config.browser.headless);
            assert!(!config.browser.sandbox);
            assert!(config.fail_fast);
            assert!(config.screenshot_on_failure);
            assert_eq!(config.output_dir, PathBuf::from("out"));
        }

        #[test]
        fn test_no_flags_keep_file_values() {
            let mut config = RunConfig {
                fail_fast: true,
                ..RunConfig::default()
            };
            apply_overrides(&mut config, &RunArgs::default());
            assert!(config.fail_fast);
            assert_eq!(config.scenarios.len(), 3);
        }

        #[test]
        fn test_short_timeout_pulls_poll_interval_down() {
            let args = RunArgs {
                timeout: Some(20),
                ..RunArgs::default()
            };
            let mut config = RunConfig::default();
            apply_overrides(&mut config, &args);
            assert_eq!(config.timeout_ms, 20);
            assert!(config.poll_interval_ms <= 20);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_invalid_override_rejected() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("run.yaml");
            std::fs::write(&path, "").unwrap();
            let args = RunArgs {
                config: Some(path),
                base_url: Some("not a url".to_string()),
                ..RunArgs::default()
            };
            assert!(resolve_config(&args).is_err());
        }
    }

    mod fixture_tests {
        use super::*;

        #[test]
        fn test_validation_only_run_skips_fixture() {
            let config = RunConfig {
                fixture: PathBuf::from("/nonexistent/monsters.json"),
                scenarios: vec![ScenarioKind::RequiredFields],
                ..RunConfig::default()
            };
            assert!(load_fixture(&config).unwrap().is_empty());
        }

        #[test]
        fn test_crud_requires_fixture() {
            let config = RunConfig {
                fixture: PathBuf::from("/nonexistent/monsters.json"),
                ..RunConfig::default()
            };
            assert!(load_fixture(&config).is_err());
        }
    }

    mod suite_tests {
        use super::*;

        #[tokio::test]
        async fn test_fake_run_writes_report() {
            let dir = tempfile::tempdir().unwrap();
            let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("../../fixtures/monsters.json");
            let args = RunArgs {
                config: Some(dir.path().join("absent.yaml")),
                ..RunArgs::default()
            };
            assert!(resolve_config(&args).is_err());

            std::fs::write(dir.path().join("run.yaml"), "poll_interval_ms: 5\n").unwrap();
            let args = RunArgs {
                config: Some(dir.path().join("run.yaml")),
                fixture: Some(fixture),
                driver: DriverArg::Fake,
                timeout: Some(500),
                output_dir: Some(dir.path().to_path_buf()),
                format: OutputFormatArg::Text,
                ..RunArgs::default()
            };
            let command =
                SuiteCommand::new(CliConfig::new().with_verbosity(Verbosity::Quiet));
            let outcome = command.execute(&args).await.unwrap();

            assert!(outcome.success(), "{}", outcome.report.summary());
            assert_eq!(outcome.report.passed, 3);
            assert!(outcome.report_path.ends_with("report.json"));
            assert!(outcome.report_path.exists());
        }
    }
}
