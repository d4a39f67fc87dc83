//! monster-probe: run the monster page suite from the command line
//!
//! ## Usage
//!
//! ```bash
//! monster-probe run                                   # all scenarios in Chromium
//! monster-probe run -s required-fields --headed       # one scenario, visible browser
//! monster-probe run --driver fake --format json       # dry run, JSON report on stdout
//! monster-probe check-fixture fixtures/monsters.json
//! ```

use clap::Parser;
use monster_probe_cli::{handlers, logging, Cli, CliResult, Commands, SuiteCommand};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// `Ok(false)` when the suite ran and a scenario failed
fn run() -> CliResult<bool> {
    let cli = Cli::parse();
    let config = cli.cli_config();
    logging::init(&config)?;

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Run(args) => {
            drop(stdout);
            let outcome = SuiteCommand::new(config).run(&args)?;
            Ok(outcome.success())
        }
        Commands::CheckFixture(args) => {
            handlers::execute_check_fixture(&args, &mut stdout)?;
            Ok(true)
        }
        Commands::Locators(args) => {
            handlers::execute_locators(&args, &mut stdout)?;
            Ok(true)
        }
        Commands::Config(args) => {
            handlers::execute_config(&args, &mut stdout)?;
            Ok(true)
        }
    }
}
