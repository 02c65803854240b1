//! Run command handler: tests, report generation, then serving

use super::reporter_for;
use crate::commands::RunArgs;
use crate::config::{load_structure_config, CliConfig};
use crate::dev_server::{format_server_url, serve_blocking, ReportServerConfig};
use crate::error::CliResult;
use crate::runner::{allure_stage, pytest_stage, StageRunner};
use std::path::{Path, PathBuf};
use testmirror::{MirrorContext, REPORTS_DIR};

/// Reports directory inside the mirrored test tree
#[must_use]
pub fn reports_dir(project_dir: &Path, test_dir: &str) -> PathBuf {
    project_dir.join(test_dir).join(REPORTS_DIR)
}

/// Execute the run command
///
/// A failing test run still produces a report unless `config.fail_fast`
/// is set. A failing report generation always aborts before serving.
pub fn execute_run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    let structure = load_structure_config(&args.file.config, &args.overrides)?;
    let project_dir = MirrorContext::canonicalize(&structure.project_dir)?;
    let reports = reports_dir(&project_dir, &structure.test_dir);

    let reporter = reporter_for(config);
    reporter.header("Test run");
    let mut runner = StageRunner::new(reporter_for(config));
    runner.run(&pytest_stage(&project_dir, &args.pytest_args, config.fail_fast))?;
    runner.run(&allure_stage(&project_dir, &reports))?;
    let failed = runner.failed_stages();
    if !failed.is_empty() {
        reporter.warning(&format!("finished with failures in: {}", failed.join(", ")));
    }

    if args.no_serve {
        return Ok(());
    }
    reporter.info(&format!(
        "serving {} at {} (Ctrl+C to stop)",
        reports.display(),
        format_server_url(args.port)
    ));
    serve_blocking(
        ReportServerConfig::builder()
            .directory(reports)
            .port(args.port)
            .build(),
        false,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{ConfigFileArg, OverrideArgs, DEFAULT_PORT};
    use crate::config::Verbosity;
    use crate::error::CliError;
    use tempfile::TempDir;

    #[test]
    fn test_reports_dir() {
        assert_eq!(
            reports_dir(Path::new("/proj"), "_tests"),
            PathBuf::from("/proj/_tests/_reports")
        );
    }

    #[test]
    fn test_missing_project_dir_fails_before_any_stage() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("testmirror.yaml");
        std::fs::write(
            &file,
            "project_dir: gone\ntest_dir: _tests\nignore_files: []\npackage_data_dir: .\nmodule_paths_file: m.json\n",
        )
        .unwrap();
        let args = RunArgs {
            file: ConfigFileArg { config: file },
            overrides: OverrideArgs::default(),
            port: DEFAULT_PORT,
            no_serve: true,
            fail_fast: false,
            pytest_args: Vec::new(),
        };

        let err = execute_run(&CliConfig::new().with_verbosity(Verbosity::Quiet), &args)
            .unwrap_err();
        assert!(matches!(err, CliError::Mirror(_)));
    }
}
