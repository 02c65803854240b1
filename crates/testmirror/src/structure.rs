//! End-to-end structure pipeline.

use crate::assets::{install_project_assets, AssetReport};
use crate::classifier::PathClassifier;
use crate::context::{check_test_dir, MirrorContext, DEFAULT_MODULE_SUFFIX};
use crate::coverage::{write_coveragerc, DEFAULT_COVERAGERC};
use crate::error::{FsOp, MirrorError, Result};
use crate::ignore::{IgnoreSet, IgnoreSources, DEFAULT_STAGING_DIR, DEFAULT_SUBMODULES_FILE};
use crate::walker::{Mirror, MirrorReport, TreeWalker};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Validated settings for [`create_structure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureConfig {
    /// Source tree root
    pub project_dir: PathBuf,
    /// Test tree name, relative to `project_dir`
    pub test_dir: String,
    /// Ignore files; relative entries resolve against `project_dir`
    pub ignore_files: Vec<PathBuf>,
    /// Directory holding `pytest.ini` and `index.html`
    pub package_data_dir: PathBuf,
    /// Manifest file name inside the test tree
    pub module_paths_file: String,
    /// Module file suffix
    pub module_suffix: String,
    /// Submodule declarations file
    pub submodules_file: Option<PathBuf>,
    /// Staging directory for hand-written tests
    pub staging_dir: Option<String>,
    /// Coverage config file name at the project root
    pub coveragerc: String,
}

impl StructureConfig {
    /// Settings with defaults for every optional field.
    #[must_use]
    pub fn new(
        project_dir: impl Into<PathBuf>,
        test_dir: impl Into<String>,
        package_data_dir: impl Into<PathBuf>,
        module_paths_file: impl Into<String>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            test_dir: test_dir.into(),
            ignore_files: Vec::new(),
            package_data_dir: package_data_dir.into(),
            module_paths_file: module_paths_file.into(),
            module_suffix: DEFAULT_MODULE_SUFFIX.to_string(),
            submodules_file: Some(PathBuf::from(DEFAULT_SUBMODULES_FILE)),
            staging_dir: Some(DEFAULT_STAGING_DIR.to_string()),
            coveragerc: DEFAULT_COVERAGERC.to_string(),
        }
    }

    /// Replace the ignore file list
    #[must_use]
    pub fn with_ignore_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.ignore_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Set the module suffix
    #[must_use]
    pub fn with_module_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.module_suffix = suffix.into();
        self
    }

    /// Set or clear the submodule declarations file
    #[must_use]
    pub fn with_submodules_file(mut self, file: Option<PathBuf>) -> Self {
        self.submodules_file = file;
        self
    }

    /// Set or clear the staging directory
    #[must_use]
    pub fn with_staging_dir(mut self, dir: Option<String>) -> Self {
        self.staging_dir = dir;
        self
    }

    /// Set the coverage config file name
    #[must_use]
    pub fn with_coveragerc(mut self, name: impl Into<String>) -> Self {
        self.coveragerc = name.into();
        self
    }

    /// Reject values no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        let non_empty = [
            ("test_dir", self.test_dir.as_str()),
            ("module_paths_file", self.module_paths_file.as_str()),
            ("module_suffix", self.module_suffix.as_str()),
            ("coveragerc", self.coveragerc.as_str()),
        ];
        for (key, value) in non_empty {
            if value.trim().is_empty() {
                return Err(MirrorError::config(format!("'{key}' must not be empty")));
            }
        }
        check_test_dir(&self.test_dir)?;
        if Path::new(&self.module_paths_file).components().count() != 1 {
            return Err(MirrorError::config(format!(
                "'module_paths_file' must be a file name, got '{}'",
                self.module_paths_file
            )));
        }
        Ok(())
    }
}

/// What a structure run produced.
#[derive(Debug, Clone)]
pub struct StructureReport {
    /// Canonical project directory
    pub project_dir: PathBuf,
    /// Absolute test tree root
    pub test_root: PathBuf,
    /// Patterns in force for the run
    pub ignore: IgnoreSet,
    /// Coverage config written
    pub coveragerc_path: PathBuf,
    /// Manifest written
    pub manifest_path: PathBuf,
    /// Asset copy results
    pub assets: AssetReport,
    /// Mirror counters and manifest
    pub mirror: MirrorReport,
}

/// Build or refresh the test structure described by `config`.
///
/// Stops at the first fatal error; the manifest is only written after
/// the whole tree was mirrored.
pub fn create_structure(
    config: &StructureConfig,
    self_name: Option<&str>,
) -> Result<StructureReport> {
    config.validate()?;
    let ctx = MirrorContext::new(&config.project_dir, config.test_dir.as_str())?
        .with_module_suffix(config.module_suffix.as_str())
        .with_self_name(self_name.map(str::to_string));
    let _enter = ctx.span().enter();
    info!(test_dir = %ctx.test_dir_name(), "creating test structure");

    let mut sources = IgnoreSources::new().with_manifest_name(config.module_paths_file.as_str());
    sources.ignore_files.clone_from(&config.ignore_files);
    sources.submodules_file.clone_from(&config.submodules_file);
    sources.staging_dir.clone_from(&config.staging_dir);
    let ignore = IgnoreSet::resolve(&ctx, &sources)?;

    let coveragerc_path = ctx.project_dir().join(&config.coveragerc);
    write_coveragerc(&coveragerc_path, &ignore)?;

    let package_data_dir = resolve_package_data(&ctx, &config.package_data_dir);
    let assets = install_project_assets(&ctx, &package_data_dir, config.staging_dir.as_deref())?;

    let classifier = PathClassifier::new(&ignore, ctx.project_dir(), ctx.self_name());
    let walker = TreeWalker::new(ctx.project_dir(), &classifier);
    let mirror = Mirror::new(&ctx).run(walker)?;

    let test_root = ctx.test_root();
    std::fs::create_dir_all(&test_root)
        .map_err(|e| MirrorError::fs(FsOp::CreateDir, &test_root, e))?;
    let manifest_path = test_root.join(&config.module_paths_file);
    mirror.manifest.write(&manifest_path)?;
    info!(
        path = %manifest_path.display(),
        entries = mirror.manifest.len(),
        "wrote manifest"
    );

    Ok(StructureReport {
        project_dir: ctx.project_dir().to_path_buf(),
        test_root,
        ignore,
        coveragerc_path,
        manifest_path,
        assets,
        mirror,
    })
}

fn resolve_package_data(ctx: &MirrorContext, dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        ctx.project_dir().join(dir)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::manifest::DEFAULT_MANIFEST_NAME;
    use tempfile::TempDir;

    #[test]
    fn validate_rejects_empty_fields() {
        let config = StructureConfig::new("/p", "", "/data", DEFAULT_MANIFEST_NAME);
        assert!(config.validate().unwrap_err().is_config());

        let config = StructureConfig::new("/p", "_tests", "/data", "");
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn validate_rejects_nested_manifest_path() {
        let config = StructureConfig::new("/p", "_tests", "/data", "out/paths.json");
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn validate_rejects_test_dir_outside_a_subdirectory() {
        for test_dir in [".", "..", "../x", "a/../b", "./_tests", "/abs"] {
            let config = StructureConfig::new("/p", test_dir, "/data", DEFAULT_MANIFEST_NAME);
            assert!(
                config.validate().unwrap_err().is_config(),
                "accepted test_dir {test_dir:?}"
            );
        }
        let nested = StructureConfig::new("/p", "qa/_tests", "/data", DEFAULT_MANIFEST_NAME);
        assert!(nested.validate().is_ok());
    }

    #[test]
    fn dot_test_dir_leaves_source_untouched() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("proj");
        std::fs::create_dir_all(project.join("a")).unwrap();
        std::fs::write(project.join("a/mod1.py"), "").unwrap();

        for test_dir in [".", ".."] {
            let config = StructureConfig::new(&project, test_dir, &project, DEFAULT_MANIFEST_NAME);
            assert!(create_structure(&config, None).unwrap_err().is_config());
        }

        let mut names: Vec<String> = std::fs::read_dir(project.join("a"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["mod1.py"]);
        assert!(!temp.path().join("a").exists());
        assert!(!project.join(".coveragerc").exists());
    }

    #[test]
    fn missing_project_dir_fails_before_mutation() {
        let temp = TempDir::new().unwrap();
        let config = StructureConfig::new(
            temp.path().join("absent"),
            "_tests",
            temp.path(),
            DEFAULT_MANIFEST_NAME,
        );
        assert!(create_structure(&config, None).unwrap_err().is_config());
        assert!(!temp.path().join("absent").exists());
    }

    #[test]
    fn empty_project_writes_empty_manifest() {
        let temp = TempDir::new().unwrap();
        let config =
            StructureConfig::new(temp.path(), "_tests", temp.path(), DEFAULT_MANIFEST_NAME);

        let report = create_structure(&config, None).unwrap();

        assert!(report.mirror.manifest.is_empty());
        assert_eq!(
            std::fs::read_to_string(&report.manifest_path).unwrap(),
            "{}\n"
        );
        assert!(report.coveragerc_path.is_file());
    }

    #[test]
    fn self_name_is_not_mirrored() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("generate.py"), "").unwrap();
        std::fs::write(temp.path().join("app.py"), "").unwrap();
        let config =
            StructureConfig::new(temp.path(), "_tests", temp.path(), DEFAULT_MANIFEST_NAME);

        let report = create_structure(&config, Some("generate.py")).unwrap();

        assert_eq!(report.mirror.manifest.len(), 1);
        assert!(!report.test_root.join("test_generate.py").exists());
        assert!(report.test_root.join("test_app.py").is_file());
    }
}
