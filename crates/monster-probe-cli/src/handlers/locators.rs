//! `locators`: print the effective locator table

use crate::commands::{LocatorsArgs, OutputFormatArg};
use crate::error::CliResult;
use crate::output::locator_table;
use crate::runner::load_config;
use std::io::Write;

/// Print locators after config overrides
///
/// # Errors
///
/// Returns error if the config cannot be loaded or output fails
pub fn execute_locators(args: &LocatorsArgs, out: &mut impl Write) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    match args.format {
        OutputFormatArg::Text => write!(out, "{}", locator_table(&config.locators.entries()))?,
        OutputFormatArg::Json => {
            let json = serde_json::to_string_pretty(&config.locators)
                .map_err(monster_probe::ProbeError::from)?;
            writeln!(out, "{json}")?;
        }
    }
    Ok(())
}
