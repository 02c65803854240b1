//! End-to-end tests for the structure pipeline against real temp trees.

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use testmirror::{create_structure, Manifest, MirrorError, StructureConfig, DEFAULT_MANIFEST_NAME};

// ============================================================================
// Fixtures
// ============================================================================

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// `a/mod1.py`, `a/mod2.py`, `b/mod3.py` with `b/*` in the skip list.
fn scenario() -> (TempDir, StructureConfig) {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "a/mod1.py", "def f():\n    return 1\n");
    write(root, "a/mod2.py", "");
    write(root, "b/mod3.py", "");
    write(root, "tests_skip.txt", "b/*\ndata\n");
    write(root, ".git/HEAD", "ref: refs/heads/main\n");
    write(root, "data/pytest.ini", "[pytest]\n");
    write(root, "data/index.html", "<html></html>\n");

    let config = StructureConfig::new(root, "_tests", root.join("data"), DEFAULT_MANIFEST_NAME)
        .with_ignore_files([".gitignore", "tests_skip.txt"]);
    (temp, config)
}

// ============================================================================
// Scenario
// ============================================================================

#[test]
fn mirrors_scenario_tree() {
    let (_temp, config) = scenario();
    let report = create_structure(&config, None).unwrap();
    let tests = &report.test_root;

    assert!(tests.join("a/__init__.py").is_file());
    assert!(tests.join("a/test_mod1.py").is_file());
    assert!(tests.join("a/test_mod2.py").is_file());
    assert!(!tests.join("b").exists());
    assert!(!tests.join(".git").exists());

    let manifest = Manifest::read(&report.manifest_path).unwrap();
    assert_eq!(manifest.len(), 2);
    let project = report.project_dir.to_string_lossy().into_owned();
    assert_eq!(
        manifest.get(&format!("{project}/_tests/a/test_mod1.py")),
        Some(format!("{project}/a/mod1.py").as_str())
    );

    let coverage = fs::read_to_string(&report.coveragerc_path).unwrap();
    for pattern in ["b/*", "_tests", ".git", "my_tests", DEFAULT_MANIFEST_NAME] {
        assert!(
            coverage.contains(&format!("    {pattern}\n")),
            "missing {pattern} in {coverage}"
        );
    }
}

#[test]
fn stub_imports_module_by_dotted_path() {
    let (_temp, config) = scenario();
    let report = create_structure(&config, None).unwrap();

    let stub = fs::read_to_string(report.test_root.join("a/test_mod1.py")).unwrap();
    assert!(stub.starts_with("import unittest\nfrom a.mod1 import *\n"));
    assert!(stub.contains("class TestMod1(unittest.TestCase):"));
    assert!(stub.contains("    def test_mod1(self):"));
}

#[test]
fn installs_assets() {
    let (temp, config) = scenario();
    write(temp.path(), "my_tests/test_custom.py", "# custom\n");

    let report = create_structure(&config, None).unwrap();

    assert!(report.project_dir.join("pytest.ini").is_file());
    assert!(report.test_root.join("_reports/index.html").is_file());
    assert_eq!(
        fs::read_to_string(report.test_root.join("test_custom.py")).unwrap(),
        "# custom\n"
    );
    assert!(!report.test_root.join("my_tests").exists());
}

// ============================================================================
// Invariants
// ============================================================================

#[test]
fn rerun_is_idempotent() {
    let (_temp, config) = scenario();
    let first = create_structure(&config, None).unwrap();
    let manifest_before = fs::read(&first.manifest_path).unwrap();
    let coverage_before = fs::read(&first.coveragerc_path).unwrap();

    let second = create_structure(&config, None).unwrap();

    assert_eq!(fs::read(&second.manifest_path).unwrap(), manifest_before);
    assert_eq!(fs::read(&second.coveragerc_path).unwrap(), coverage_before);
    assert_eq!(second.mirror.stubs_created, 0);
    assert_eq!(second.mirror.stubs_kept, 2);
}

#[test]
fn edited_stub_survives_rerun() {
    let (_temp, config) = scenario();
    let report = create_structure(&config, None).unwrap();
    let stub = report.test_root.join("a/test_mod1.py");
    fs::write(&stub, "def test_real():\n    assert True\n").unwrap();

    create_structure(&config, None).unwrap();

    assert_eq!(
        fs::read_to_string(&stub).unwrap(),
        "def test_real():\n    assert True\n"
    );
}

#[test]
fn new_module_is_added_on_rerun() {
    let (temp, config) = scenario();
    create_structure(&config, None).unwrap();
    write(temp.path(), "a/mod4.py", "");

    let report = create_structure(&config, None).unwrap();

    assert_eq!(report.mirror.stubs_created, 1);
    assert_eq!(report.mirror.manifest.len(), 3);
}

#[test]
fn directories_without_modules_are_pruned() {
    let (temp, config) = scenario();
    fs::create_dir_all(temp.path().join("empty")).unwrap();
    write(temp.path(), "cache/x.pyc", "");
    write(temp.path(), ".gitignore", "*.pyc\n");

    let report = create_structure(&config, None).unwrap();

    assert!(!report.test_root.join("empty").exists());
    assert!(!report.test_root.join("cache").exists());
}

#[test]
fn submodules_are_never_mirrored() {
    let (temp, config) = scenario();
    write(
        temp.path(),
        ".gitmodules",
        "[submodule \"lib\"]\n\tpath = vendor/lib\n\turl = https://example.com/lib.git\n",
    );
    write(temp.path(), "vendor/lib/core.py", "");
    write(temp.path(), "vendor/own.py", "");

    let report = create_structure(&config, None).unwrap();

    assert!(!report.test_root.join("vendor/lib").exists());
    assert!(report.test_root.join("vendor/test_own.py").is_file());
    assert!(report
        .mirror
        .manifest
        .iter()
        .all(|(_, module)| !module.contains("vendor/lib")));
}

#[cfg(unix)]
#[test]
fn symlink_cycle_fails_without_manifest() {
    let (temp, config) = scenario();
    std::os::unix::fs::symlink(temp.path().join("a"), temp.path().join("a/loop")).unwrap();

    let err = create_structure(&config, None).unwrap_err();

    assert!(matches!(err, MirrorError::SymlinkCycle { .. }));
    assert!(!temp
        .path()
        .join("_tests")
        .join(DEFAULT_MANIFEST_NAME)
        .exists());
}

#[cfg(unix)]
#[test]
fn symlinked_directory_is_followed() {
    let (temp, config) = scenario();
    let outside = TempDir::new().unwrap();
    write(outside.path(), "ext.py", "");
    std::os::unix::fs::symlink(outside.path(), temp.path().join("linked")).unwrap();

    let report = create_structure(&config, None).unwrap();

    assert!(report.test_root.join("linked/test_ext.py").is_file());
}
