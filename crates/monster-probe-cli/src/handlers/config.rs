//! `config`: print the effective run configuration as YAML

use crate::commands::ConfigArgs;
use crate::error::CliResult;
use crate::runner::load_config;
use std::io::Write;

/// Print the loaded (or default) configuration
///
/// # Errors
///
/// Returns error if the config cannot be loaded or serialized
pub fn execute_config(args: &ConfigArgs, out: &mut impl Write) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    write!(out, "{}", config.to_yaml()?)?;
    Ok(())
}
