//! testmirror CLI library
//!
//! Command-line front end for the `testmirror` crate: builds the mirrored
//! test tree, runs the test and report stages, and serves the reports.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
pub mod dev_server;
mod error;
pub mod handlers;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    Cli, ColorArg, Commands, ConfigArgs, ConfigFileArg, ConfigFormat, CreateArgs, OverrideArgs,
    RunArgs, ServeArgs, DEFAULT_CONFIG_FILE, DEFAULT_PORT,
};
pub use config::{load_structure_config, CliConfig, ColorChoice, ProjectFile, Verbosity};
pub use dev_server::{
    format_server_url, open_browser, serve_blocking, ReportServer, ReportServerConfig,
    ReportServerConfigBuilder,
};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::{summary_fields, ProgressReporter};
pub use runner::{
    allure_stage, install_allure_stage, pytest_stage, Stage, StagePolicy, StageResult,
    StageRunner,
};
