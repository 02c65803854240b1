//! External stage execution (pytest, allure, npm)

use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// How a non-zero exit is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StagePolicy {
    /// Abort the run
    #[default]
    Fatal,
    /// Log a warning and continue with the next stage
    BestEffort,
}

/// One external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    /// Short stage name used in messages
    pub name: String,
    /// Program to execute
    pub program: String,
    /// Arguments
    pub args: Vec<String>,
    /// Working directory; the process working directory is never changed
    pub current_dir: Option<PathBuf>,
    /// Exit status policy
    pub policy: StagePolicy,
}

impl Stage {
    /// Create a fatal stage with no arguments
    #[must_use]
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            policy: StagePolicy::Fatal,
        }
    }

    /// Append an argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set the exit status policy
    #[must_use]
    pub const fn policy(mut self, policy: StagePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Printable command line
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion with inherited stdio.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::StageFailed`] if the program cannot be spawned,
    /// or exits non-zero under [`StagePolicy::Fatal`].
    pub fn run(&self) -> CliResult<StageResult> {
        let start = Instant::now();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(ref dir) = self.current_dir {
            cmd.current_dir(dir);
        }
        info!(stage = %self.name, command = %self.command_line(), "running stage");

        let status = cmd.status().map_err(|e| {
            CliError::stage_failed(&self.name, format!("cannot run '{}': {e}", self.program))
        })?;
        let result = StageResult {
            name: self.name.clone(),
            success: status.success(),
            code: status.code(),
            duration: start.elapsed(),
        };

        if result.success {
            return Ok(result);
        }
        let message = match status.code() {
            Some(code) => format!("'{}' exited with status {code}", self.command_line()),
            None => format!("'{}' was terminated by a signal", self.command_line()),
        };
        match self.policy {
            StagePolicy::Fatal => Err(CliError::stage_failed(&self.name, message)),
            StagePolicy::BestEffort => {
                warn!(stage = %self.name, "{message}, continuing");
                Ok(result)
            }
        }
    }
}

/// Outcome of a stage that ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    /// Stage name
    pub name: String,
    /// Whether the exit status was zero
    pub success: bool,
    /// Exit code, if the process exited normally
    pub code: Option<i32>,
    /// Wall time
    pub duration: Duration,
}

/// `pytest` in the project directory
#[must_use]
pub fn pytest_stage(project_dir: &Path, extra_args: &[String], fail_fast: bool) -> Stage {
    let policy = if fail_fast {
        StagePolicy::Fatal
    } else {
        StagePolicy::BestEffort
    };
    Stage::new("pytest", "pytest")
        .args(extra_args.iter().cloned())
        .current_dir(project_dir)
        .policy(policy)
}

/// `allure generate` over the reports directory
#[must_use]
pub fn allure_stage(project_dir: &Path, reports_dir: &Path) -> Stage {
    Stage::new("allure", "allure")
        .arg("generate")
        .arg(reports_dir.join("allure-results").to_string_lossy())
        .arg("--clean")
        .arg("-o")
        .arg(reports_dir.join("allure-report").to_string_lossy())
        .current_dir(project_dir)
}

/// Global npm install of the Allure command line
#[must_use]
pub fn install_allure_stage() -> Stage {
    Stage::new("npm", "npm").args(["install", "-g", "allure-commandline"])
}

/// Runs stages in order and reports each one
#[derive(Debug)]
pub struct StageRunner {
    reporter: ProgressReporter,
    results: Vec<StageResult>,
}

impl StageRunner {
    /// Create a runner printing through `reporter`
    #[must_use]
    pub fn new(reporter: ProgressReporter) -> Self {
        Self {
            reporter,
            results: Vec::new(),
        }
    }

    /// Run one stage, stopping the sequence on a fatal failure
    pub fn run(&mut self, stage: &Stage) -> CliResult<StageResult> {
        self.reporter.info(&format!("{}: {}", stage.name, stage.command_line()));
        let result = match stage.run() {
            Ok(result) => result,
            Err(e) => {
                self.reporter.failure(&e.to_string());
                return Err(e);
            }
        };

        if result.success {
            self.reporter.success(&format!(
                "{} finished in {:.2}s",
                result.name,
                result.duration.as_secs_f64()
            ));
        } else {
            self.reporter.warning(&format!(
                "{} failed (exit code {}), continuing",
                result.name,
                result.code.map_or_else(|| "none".to_string(), |c| c.to_string())
            ));
        }
        self.results.push(result.clone());
        Ok(result)
    }

    /// Names of stages that ran but exited non-zero, in run order
    #[must_use]
    pub fn failed_stages(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.name.as_str())
            .collect()
    }
}
