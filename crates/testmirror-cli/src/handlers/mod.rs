//! Command handlers, kept out of `main.rs` so they can be tested
//!
//! Each handler module contains:
//! - The execution logic for one subcommand
//! - Pure helper functions
//! - Tests

pub mod config;
pub mod create;
pub mod install;
pub mod run;
pub mod serve;

pub use config::{execute_config, render_config};
pub use create::execute_create;
pub use install::execute_install_allure;
pub use run::{execute_run, reports_dir};
pub use serve::{build_server_config, execute_serve};

use crate::config::CliConfig;
use crate::output::ProgressReporter;

/// Reporter matching the global color and verbosity flags
#[must_use]
pub fn reporter_for(config: &CliConfig) -> ProgressReporter {
    ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet())
}
