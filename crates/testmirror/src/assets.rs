//! Project assets installed next to the mirrored tree.
//!
//! The runner configuration goes to the project root, the report landing
//! page to `<test_dir>/_reports/`, and hand-written tests from the
//! staging directory are copied into the test tree on every run.

use crate::context::MirrorContext;
use crate::error::{FsOp, MirrorError, Result};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Reports directory inside the test tree.
pub const REPORTS_DIR: &str = "_reports";

/// Test runner configuration asset.
pub const RUNNER_CONFIG: &str = "pytest.ini";

/// Report landing page asset.
pub const REPORT_INDEX: &str = "index.html";

/// File pattern picked up from the staging directory.
pub const STAGED_TEST_GLOB: &str = "test_*.py";

/// Files copied or skipped while installing assets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetReport {
    /// Destination paths written
    pub copied: Vec<PathBuf>,
    /// Source paths that were absent
    pub missing: Vec<PathBuf>,
}

impl AssetReport {
    fn record(&mut self, src: &Path, dest: PathBuf, copied: bool) {
        if copied {
            self.copied.push(dest);
        } else {
            self.missing.push(src.to_path_buf());
        }
    }
}

/// Copy `src` to `dest`, overwriting. A missing source returns `Ok(false)`.
pub fn copy_asset(src: &Path, dest: &Path) -> Result<bool> {
    if !src.exists() {
        warn!(path = %src.display(), "asset not found, skipping");
        return Ok(false);
    }
    if dest.exists() && same_file(src, dest)? {
        return Err(MirrorError::fs(
            FsOp::Copy,
            dest,
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{}' and destination are the same file", src.display()),
            ),
        ));
    }
    std::fs::copy(src, dest).map_err(|e| MirrorError::fs(FsOp::Copy, dest, e))?;
    debug!(from = %src.display(), to = %dest.display(), "copied asset");
    Ok(true)
}

fn same_file(a: &Path, b: &Path) -> Result<bool> {
    Ok(MirrorContext::canonicalize(a)? == MirrorContext::canonicalize(b)?)
}

/// Install runner config, report page and staged tests for `ctx`.
pub fn install_project_assets(
    ctx: &MirrorContext,
    package_data_dir: &Path,
    staging_dir: Option<&str>,
) -> Result<AssetReport> {
    let _enter = ctx.span().enter();
    let mut report = AssetReport::default();

    let src = package_data_dir.join(RUNNER_CONFIG);
    let dest = ctx.project_dir().join(RUNNER_CONFIG);
    let copied = copy_asset(&src, &dest)?;
    report.record(&src, dest, copied);

    let reports_dir = ctx.test_root().join(REPORTS_DIR);
    std::fs::create_dir_all(&reports_dir)
        .map_err(|e| MirrorError::fs(FsOp::CreateDir, &reports_dir, e))?;

    let src = package_data_dir.join(REPORT_INDEX);
    let dest = reports_dir.join(REPORT_INDEX);
    let copied = copy_asset(&src, &dest)?;
    report.record(&src, dest, copied);

    if let Some(staging) = staging_dir {
        for src in staged_tests(&ctx.project_dir().join(staging))? {
            let Some(name) = src.file_name() else {
                continue;
            };
            let dest = ctx.test_root().join(name);
            let copied = copy_asset(&src, &dest)?;
            report.record(&src, dest, copied);
        }
    }

    info!(
        copied = report.copied.len(),
        missing = report.missing.len(),
        "installed project assets"
    );
    Ok(report)
}

/// Hand-written test files in `staging`, sorted. A missing directory yields none.
pub fn staged_tests(staging: &Path) -> Result<Vec<PathBuf>> {
    if !staging.is_dir() {
        debug!(path = %staging.display(), "no staging directory");
        return Ok(Vec::new());
    }
    let pattern = format!(
        "{}/{STAGED_TEST_GLOB}",
        glob::Pattern::escape(&staging.to_string_lossy())
    );
    let paths = glob::glob(&pattern).map_err(|e| {
        MirrorError::config(format!("invalid staging pattern '{pattern}': {e}"))
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            MirrorError::fs(FsOp::Read, path, io::Error::from(e))
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
