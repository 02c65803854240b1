//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "testmirror.yaml";

/// Default report server port.
pub const DEFAULT_PORT: u16 = 8000;

/// testmirror: mirror a Python project into a test tree and run its tests
#[derive(Parser, Debug)]
#[command(name = "testmirror")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or refresh the mirrored test structure
    Create(CreateArgs),

    /// Run the tests, generate the Allure report and serve it
    Run(RunArgs),

    /// Serve a reports directory over HTTP
    Serve(ServeArgs),

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Install the Allure command line through npm
    InstallAllure,
}

/// Configuration file selection, shared by several commands
#[derive(Args, Debug, Clone)]
pub struct ConfigFileArg {
    /// Configuration file (YAML if .yaml/.yml, JSON otherwise)
    #[arg(short, long = "config", default_value = DEFAULT_CONFIG_FILE, env = "TESTMIRROR_CONFIG")]
    pub config: PathBuf,
}

/// Values that override the configuration file
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Project directory to mirror
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Test directory name inside the project
    #[arg(long)]
    pub test_dir: Option<String>,

    /// Ignore file (repeatable); replaces the configured list
    #[arg(long = "ignore-file", value_name = "FILE")]
    pub ignore_files: Vec<PathBuf>,

    /// Directory holding pytest.ini and index.html
    #[arg(long)]
    pub package_data_dir: Option<PathBuf>,
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Configuration file
    #[command(flatten)]
    pub file: ConfigFileArg,

    /// Command-line overrides
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file
    #[command(flatten)]
    pub file: ConfigFileArg,

    /// Command-line overrides
    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Report server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Stop after generating the report instead of serving it
    #[arg(long)]
    pub no_serve: bool,

    /// Treat a failing test run as fatal
    #[arg(long)]
    pub fail_fast: bool,

    /// Extra arguments passed to pytest (after `--`)
    #[arg(last = true)]
    pub pytest_args: Vec<String>,
}

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Directory to serve
    #[arg(short = 'd', long = "dir", default_value = "_tests/_reports")]
    pub directory: PathBuf,

    /// HTTP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,

    /// Enable CORS for cross-origin requests
    #[arg(long)]
    pub cors: bool,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Configuration file
    #[command(flatten)]
    pub file: ConfigFileArg,

    /// Command-line overrides
    #[command(flatten)]
    pub overrides: OverrideArgs,

    /// Output format
    #[arg(short, long, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Output format for the config command
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML
    #[default]
    Yaml,
    /// JSON
    Json,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
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
