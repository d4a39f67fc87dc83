//! monster-probe CLI library
//!
//! Command-line front end for the monster page suite: argument parsing,
//! logging setup, progress output and the `run` pipeline.

#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    CheckFixtureArgs, Cli, ColorArg, Commands, ConfigArgs, DriverArg, LocatorsArgs, LogFormatArg,
    OutputFormatArg, RunArgs, ScenarioArg,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{locator_table, scenario_line, OutputFormat, ProgressReporter};
pub use runner::{
    apply_overrides, load_config, load_fixture, resolve_config, RunOutcome, SuiteCommand,
    CONFIG_FILE,
};
