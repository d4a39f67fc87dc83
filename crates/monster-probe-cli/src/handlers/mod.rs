//! Command handlers - extracted from main.rs for testability
//!
//! Handlers write to any `io::Write` so tests can capture their output.

pub mod config;
pub mod fixture;
pub mod locators;

pub use config::execute_config;
pub use fixture::execute_check_fixture;
pub use locators::execute_locators;
