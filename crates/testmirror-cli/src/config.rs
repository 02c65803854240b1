//! CLI configuration and project configuration loading

use crate::commands::{Cli, Commands, OverrideArgs};
use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use testmirror::StructureConfig;
use tracing::debug;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - errors only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - progress of every step
    Verbose,
    /// Debug - every excluded path and copied file
    Debug,
}

impl Verbosity {
    /// Map `-v` count and `-q` to a level; `-q` wins
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default log filter directive for this level
    #[must_use]
    pub const fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Treat every failing stage as fatal
    pub fail_fast: bool,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set fail fast
    #[must_use]
    pub const fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Configuration from parsed global flags and the chosen command
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        let fail_fast = matches!(&cli.command, Commands::Run(args) if args.fail_fast);
        Self::new()
            .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
            .with_color(cli.color.clone().into())
            .with_fail_fast(fail_fast)
    }
}

/// Project configuration file contents before validation.
///
/// Every key is optional here so that command-line overrides can fill
/// gaps before required keys are checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectFile {
    /// Source tree root
    pub project_dir: Option<PathBuf>,
    /// Test tree name
    pub test_dir: Option<String>,
    /// Ignore files
    pub ignore_files: Option<Vec<PathBuf>>,
    /// Package data directory
    pub package_data_dir: Option<PathBuf>,
    /// Manifest file name
    pub module_paths_file: Option<String>,
    /// Module suffix
    pub module_suffix: Option<String>,
    /// Submodule declarations file
    pub submodules_file: Option<PathBuf>,
    /// Staging directory
    pub staging_dir: Option<String>,
    /// Coverage config file name
    pub coveragerc: Option<String>,
}

impl ProjectFile {
    /// Parse `text`, as YAML when `path` ends in `.yaml`/`.yml` and JSON otherwise.
    pub fn parse(path: &Path, text: &str) -> CliResult<Self> {
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let parsed = if is_yaml {
            serde_yaml_ng::from_str(text).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(text).map_err(|e| e.to_string())
        };
        parsed.map_err(|e| CliError::config(format!("cannot parse '{}': {e}", path.display())))
    }

    /// Load and parse a configuration file.
    ///
    /// Relative `project_dir` and `package_data_dir` are resolved against
    /// the file's directory.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("cannot read config file '{}': {e}", path.display()))
        })?;
        let mut file = Self::parse(path, &text)?;

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        file.project_dir = file.project_dir.map(|p| base.join(p));
        file.package_data_dir = file.package_data_dir.map(|p| base.join(p));
        debug!(path = %path.display(), "loaded config file");
        Ok(file)
    }

    /// Replace file values with any values given on the command line.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &OverrideArgs) -> Self {
        if let Some(ref dir) = overrides.project_dir {
            self.project_dir = Some(dir.clone());
        }
        if let Some(ref dir) = overrides.test_dir {
            self.test_dir = Some(dir.clone());
        }
        if !overrides.ignore_files.is_empty() {
            self.ignore_files = Some(overrides.ignore_files.clone());
        }
        if let Some(ref dir) = overrides.package_data_dir {
            self.package_data_dir = Some(dir.clone());
        }
        self
    }

    /// Check required keys and apply defaults.
    pub fn into_structure_config(self) -> CliResult<StructureConfig> {
        let project_dir = require(self.project_dir, "project_dir")?;
        let test_dir = require(self.test_dir, "test_dir")?;
        let ignore_files = require(self.ignore_files, "ignore_files")?;
        let package_data_dir = require(self.package_data_dir, "package_data_dir")?;
        let module_paths_file = require(self.module_paths_file, "module_paths_file")?;

        let mut config =
            StructureConfig::new(project_dir, test_dir, package_data_dir, module_paths_file)
                .with_ignore_files(ignore_files);
        if let Some(suffix) = self.module_suffix {
            config = config.with_module_suffix(suffix);
        }
        if let Some(file) = self.submodules_file {
            config = config.with_submodules_file(Some(file));
        }
        if let Some(dir) = self.staging_dir {
            config = config.with_staging_dir(Some(dir));
        }
        if let Some(name) = self.coveragerc {
            config = config.with_coveragerc(name);
        }
        config.validate()?;
        Ok(config)
    }
}

fn require<T>(value: Option<T>, key: &str) -> CliResult<T> {
    value.ok_or_else(|| CliError::config(format!("missing required key '{key}'")))
}

/// Load, override and validate the project configuration.
pub fn load_structure_config(path: &Path, overrides: &OverrideArgs) -> CliResult<StructureConfig> {
    ProjectFile::load(path)?
        .with_overrides(overrides)
        .into_structure_config()
}
