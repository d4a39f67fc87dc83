//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use monster_probe::ScenarioKind;
use std::path::PathBuf;

/// monster-probe: browser tests for the monster CRUD page
#[derive(Parser, Debug)]
#[command(name = "monster-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (failures only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the suite against a page
    Run(RunArgs),

    /// Validate a monster fixture file
    CheckFixture(CheckFixtureArgs),

    /// Print the locator table
    Locators(LocatorsArgs),

    /// Print the effective run configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Run configuration file (default: ./monster-probe.yaml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Page under test
    #[arg(long, env = "MONSTER_PROBE_URL")]
    pub base_url: Option<String>,

    /// Monster fixture file
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Scenario to run; repeat to select several (default: all)
    #[arg(short, long = "scenario")]
    pub scenarios: Vec<ScenarioArg>,

    /// Browser driver
    #[arg(long, default_value = "chromium")]
    pub driver: DriverArg,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Chromium executable
    #[arg(long)]
    pub chromium_path: Option<String>,

    /// Disable the Chromium sandbox (containers)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Stop after the first failed scenario
    #[arg(long)]
    pub fail_fast: bool,

    /// Wait budget per query in milliseconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Directory for report.json and screenshots
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Result format on stdout
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormatArg,

    /// Save a screenshot when a scenario fails
    #[arg(long)]
    pub screenshots: bool,
}

/// Arguments for the check-fixture command
#[derive(Parser, Debug)]
pub struct CheckFixtureArgs {
    /// Fixture file to validate
    pub path: PathBuf,
}

/// Arguments for the locators command
#[derive(Parser, Debug)]
pub struct LocatorsArgs {
    /// Run configuration whose locator overrides apply
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Run configuration file (defaults printed when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Scenario selector
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScenarioArg {
    /// Create, verify and delete every fixture monster
    Crud,
    /// Empty submit shows the required-fields alert
    RequiredFields,
    /// Non-numeric stat shows the numeric alert
    NumericValidation,
}

impl From<ScenarioArg> for ScenarioKind {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::Crud => Self::Crud,
            ScenarioArg::RequiredFields => Self::RequiredFields,
            ScenarioArg::NumericValidation => Self::NumericValidation,
        }
    }
}

/// Browser driver selector
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DriverArg {
    /// Real Chromium over CDP
    #[default]
    Chromium,
    /// In-memory page (dry run of the suite)
    Fake,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<OutputFormatArg> for crate::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => Self::Text,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

impl Cli {
    /// Presentation settings from the global flags
    #[must_use]
    pub fn cli_config(&self) -> crate::config::CliConfig {
        crate::config::CliConfig::new()
            .with_verbosity(crate::config::Verbosity::from_flags(self.verbose, self.quiet))
            .with_color(self.color.into())
            .with_log_format(self.log_format.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_run_defaults() {
            let cli = Cli::parse_from(["monster-probe", "run"]);
            let Commands::Run(args) = cli.command else {
                panic!("expected Run command");
            };
            assert!(args.scenarios.is_empty());
            assert_eq!(args.driver, DriverArg::Chromium);
            assert_eq!(args.format, OutputFormatArg::Text);
            assert!(!args.headed);
        }

        #[test]
        fn test_parse_repeated_scenarios() {
            let cli = Cli::parse_from([
                "monster-probe",
                "run",
                "--scenario",
                "required-fields",
                "-s",
                "numeric-validation",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected Run command");
            };
            assert_eq!(
                args.scenarios,
                vec![ScenarioArg::RequiredFields, ScenarioArg::NumericValidation]
            );
        }

        #[test]
        fn test_parse_run_overrides() {
            let cli = Cli::parse_from([
                "monster-probe",
                "run",
                "--base-url",
                "http://127.0.0.1:8080/",
                "--driver",
                "fake",
                "--timeout",
                "500",
                "--fail-fast",
                "--no-sandbox",
                "--format",
                "json",
            ]);
            let Commands::Run(args) = cli.command else {
                panic!("expected Run command");
            };
            assert_eq!(args.base_url.as_deref(), Some("http://127.0.0.1:8080/"));
            assert_eq!(args.driver, DriverArg::Fake);
            assert_eq!(args.timeout, Some(500));
            assert!(args.fail_fast);
            assert!(args.no_sandbox);
            assert_eq!(args.format, OutputFormatArg::Json);
        }

        #[test]
        fn test_unknown_scenario_rejected() {
            assert!(Cli::try_parse_from(["monster-probe", "run", "-s", "smoke"]).is_err());
        }

        #[test]
        fn test_parse_check_fixture() {
            let cli = Cli::parse_from(["monster-probe", "check-fixture", "monsters.json"]);
            let Commands::CheckFixture(args) = cli.command else {
                panic!("expected CheckFixture command");
            };
            assert_eq!(args.path, PathBuf::from("monsters.json"));
        }

        #[test]
        fn test_global_flags() {
            let cli = Cli::parse_from([
                "monster-probe",
                "-vv",
                "--color",
                "never",
                "--log-format",
                "json",
                "locators",
            ]);
            assert_eq!(cli.verbose, 2);
            assert!(matches!(cli.color, ColorArg::Never));
            let config = cli.cli_config();
            assert_eq!(config.verbosity, crate::config::Verbosity::Debug);
            assert_eq!(config.log_format, crate::config::LogFormat::Json);
        }

        #[test]
        fn test_global_quiet_flag() {
            let cli = Cli::parse_from(["monster-probe", "config", "-q"]);
            assert!(cli.quiet);
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_scenario_arg_conversion() {
            assert_eq!(ScenarioKind::from(ScenarioArg::Crud), ScenarioKind::Crud);
            assert_eq!(
                ScenarioKind::from(ScenarioArg::NumericValidation),
                ScenarioKind::NumericValidation
            );
        }

        #[test]
        fn test_scenario_arg_names_match_library() {
            for kind in ScenarioKind::ALL {
                let arg = ScenarioArg::from_str(kind.name(), false).unwrap();
                assert_eq!(ScenarioKind::from(arg), kind);
            }
        }

        #[test]
        fn test_color_arg_conversion() {
            use crate::config::ColorChoice;

            let auto: ColorChoice = ColorArg::Auto.into();
            assert!(matches!(auto, ColorChoice::Auto));

            let never: ColorChoice = ColorArg::Never.into();
            assert!(matches!(never, ColorChoice::Never));
        }
    }
}
