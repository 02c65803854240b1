//! Run context shared by every component.
//!
//! Holds the resolved project directory and naming conventions so no
//! component needs the process working directory or global state.

use crate::error::{FsOp, MirrorError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::Span;

/// Version-control metadata directory, never mirrored.
pub const VCS_DIR: &str = ".git";

/// Package marker placed in every mirrored directory.
pub const PACKAGE_MARKER: &str = "__init__.py";

/// Prefix of every generated stub file name.
pub const STUB_PREFIX: &str = "test_";

/// Default module suffix.
pub const DEFAULT_MODULE_SUFFIX: &str = ".py";

/// Explicit context for one mirroring run.
#[derive(Debug, Clone)]
pub struct MirrorContext {
    project_dir: PathBuf,
    test_dir: String,
    module_suffix: String,
    self_name: Option<String>,
    span: Span,
}

impl MirrorContext {
    /// Create a context rooted at `project_dir`.
    ///
    /// The project directory is canonicalized; a directory that does not
    /// exist is a configuration error.
    pub fn new(project_dir: impl AsRef<Path>, test_dir: impl Into<String>) -> Result<Self> {
        let project_dir = project_dir.as_ref();
        let canonical = project_dir.canonicalize().map_err(|e| {
            MirrorError::config(format!(
                "project_dir '{}' cannot be resolved: {e}",
                project_dir.display()
            ))
        })?;
        if !canonical.is_dir() {
            return Err(MirrorError::config(format!(
                "project_dir '{}' is not a directory",
                canonical.display()
            )));
        }

        let test_dir = test_dir.into();
        check_test_dir(&test_dir)?;

        let span = tracing::info_span!("mirror", project = %canonical.display());
        Ok(Self {
            project_dir: canonical,
            test_dir,
            module_suffix: DEFAULT_MODULE_SUFFIX.to_string(),
            self_name: None,
            span,
        })
    }

    /// Set the module file suffix (default `.py`)
    #[must_use]
    pub fn with_module_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.module_suffix = suffix.into();
        self
    }

    /// Set the executing generator's own file name, excluded from mirroring
    #[must_use]
    pub fn with_self_name(mut self, name: Option<String>) -> Self {
        self.self_name = name;
        self
    }

    /// Canonical project directory (the source tree root)
    #[must_use]
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Test directory name, relative to the project directory
    #[must_use]
    pub fn test_dir_name(&self) -> &str {
        &self.test_dir
    }

    /// Absolute test tree root
    #[must_use]
    pub fn test_root(&self) -> PathBuf {
        self.project_dir.join(&self.test_dir)
    }

    /// Module file suffix
    #[must_use]
    pub fn module_suffix(&self) -> &str {
        &self.module_suffix
    }

    /// Executing generator's own file name, if known
    #[must_use]
    pub fn self_name(&self) -> Option<&str> {
        self.self_name.as_deref()
    }

    /// Logging span every component enters while working for this run
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Whether `file_name` follows the module naming convention
    #[must_use]
    pub fn is_module(&self, file_name: &str) -> bool {
        file_name.len() > self.module_suffix.len() && file_name.ends_with(&self.module_suffix)
    }

    /// Canonicalize an arbitrary path, with error context
    pub fn canonicalize(path: &Path) -> Result<PathBuf> {
        path.canonicalize()
            .map_err(|e| MirrorError::fs(FsOp::Canonicalize, path, e))
    }
}

/// Reject a test directory that is not a plain subdirectory of the project.
///
/// Only normal components are allowed, so the test tree can never be the
/// source tree itself or lie outside it.
pub fn check_test_dir(test_dir: &str) -> Result<()> {
    let segments_plain = test_dir
        .split(['/', '\\'])
        .all(|seg| !seg.is_empty() && seg != "." && seg != "..");
    let components_plain = Path::new(test_dir)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if segments_plain && components_plain {
        Ok(())
    } else {
        Err(MirrorError::config(format!(
            "test_dir must be a relative subdirectory name, got '{test_dir}'"
        )))
    }
}

/// Render a path with `/` separators for manifests and pattern matching.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Name of the currently running executable, used by the self-reference guard.
#[must_use]
pub fn current_exe_name() -> Option<String> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_canonicalizes_project_dir() {
        let temp = TempDir::new().unwrap();
        let ctx = MirrorContext::new(temp.path(), "_tests").unwrap();
        assert_eq!(ctx.project_dir(), temp.path().canonicalize().unwrap());
        assert_eq!(ctx.test_root(), ctx.project_dir().join("_tests"));
        assert_eq!(ctx.module_suffix(), ".py");
    }

    #[test]
    fn test_missing_project_dir_is_config_error() {
        let temp = TempDir::new().unwrap();
        let err = MirrorContext::new(temp.path().join("nope"), "_tests").unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_project_dir_must_be_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(MirrorContext::new(&file, "_tests").unwrap_err().is_config());
    }

    #[test]
    fn test_empty_test_dir_rejected() {
        let temp = TempDir::new().unwrap();
        assert!(MirrorContext::new(temp.path(), "").unwrap_err().is_config());
    }

    #[test]
    fn test_test_dir_must_be_plain_subdirectory() {
        let temp = TempDir::new().unwrap();
        for bad in [".", "..", "../x", "a/../b", "./_tests", "/abs"] {
            assert!(
                MirrorContext::new(temp.path(), bad).unwrap_err().is_config(),
                "accepted {bad:?}"
            );
        }
        assert!(MirrorContext::new(temp.path(), "qa/_tests").is_ok());
    }

    #[test]
    fn test_is_module() {
        let temp = TempDir::new().unwrap();
        let ctx = MirrorContext::new(temp.path(), "_tests").unwrap();
        assert!(ctx.is_module("mod1.py"));
        assert!(!ctx.is_module("mod1.pyc"));
        assert!(!ctx.is_module(".py"));
        assert!(!ctx.is_module("README.md"));

        let ctx = ctx.with_module_suffix(".pyx");
        assert!(ctx.is_module("fast.pyx"));
        assert!(!ctx.is_module("mod1.py"));
    }

    #[test]
    fn test_to_slash() {
        let p = Path::new("a").join("b").join("c.py");
        assert_eq!(to_slash(&p), "a/b/c.py");
    }
}
