//! tracing subscriber setup
//!
//! `RUST_LOG` wins over the level derived from `-v`/`-q`. Logs go to stderr
//! so `--format json` output on stdout stays parseable.

use crate::config::{CliConfig, LogFormat};
use crate::error::{CliError, CliResult};
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to `default_directive`
#[must_use]
pub fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Install the global subscriber
///
/// # Errors
///
/// Returns error if a global subscriber is already installed
pub fn init(config: &CliConfig) -> CliResult<()> {
    let filter = env_filter(config.verbosity.log_directive());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.log_format {
        LogFormat::Text => builder
            .with_ansi(config.color.should_color())
            .try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    installed.map_err(|e| CliError::config(format!("cannot install logger: {e}")))
}
