//! Placeholder test generation.
//!
//! Stubs are created once and never rewritten, so edits made by hand
//! survive every later run.

use crate::error::{FsOp, MirrorError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Component, Path};
use tracing::{debug, info};

/// Names derived from a module path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubSpec {
    /// Dotted import path, e.g. `pkg.sub.mod1`
    pub import_path: String,
    /// Test case class, e.g. `TestMod1`
    pub class_name: String,
    /// Test method, e.g. `test_mod1`
    pub method_name: String,
}

impl StubSpec {
    /// Derive names for `module_path`, a file under `project_dir`.
    #[must_use]
    pub fn from_module(project_dir: &Path, module_path: &Path, suffix: &str) -> Self {
        let rel = module_path.strip_prefix(project_dir).unwrap_or(module_path);
        let file_name = rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let module_name = file_name.strip_suffix(suffix).unwrap_or(&file_name);

        let mut segments: Vec<String> = rel
            .parent()
            .into_iter()
            .flat_map(Path::components)
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        segments.push(module_name.to_string());

        Self {
            import_path: segments.join("."),
            class_name: format!("Test{}", capitalize(module_name)),
            method_name: format!("test_{}", module_name.to_lowercase()),
        }
    }

    /// Render the stub file contents.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "import unittest\n\
             from {import} import *\n\
             \n\
             class {class}(unittest.TestCase):\n\
             \x20   def {method}(self):\n\
             \x20       # TODO: implement test case\n\
             \x20       pass\n\
             \n\
             if __name__ == '__main__':\n\
             \x20   unittest.main()\n",
            import = self.import_path,
            class = self.class_name,
            method = self.method_name,
        )
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// What [`write_stub`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubOutcome {
    /// A new stub was written
    Created,
    /// A file already existed and was left untouched
    Kept,
}

/// Write `spec` to `stub_path` unless a file is already there.
pub fn write_stub(stub_path: &Path, spec: &StubSpec) -> Result<StubOutcome> {
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(stub_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            debug!(path = %stub_path.display(), "stub exists, keeping");
            return Ok(StubOutcome::Kept);
        }
        Err(e) => return Err(MirrorError::fs(FsOp::CreateFile, stub_path, e)),
    };

    file.write_all(spec.render().as_bytes())
        .map_err(|e| MirrorError::fs(FsOp::Write, stub_path, e))?;
    info!(path = %stub_path.display(), "created test stub");
    Ok(StubOutcome::Created)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_derive_nested_module() {
        let spec = StubSpec::from_module(
            Path::new("/proj"),
            Path::new("/proj/pkg/sub/Mod1.py"),
            ".py",
        );
        assert_eq!(spec.import_path, "pkg.sub.Mod1");
        assert_eq!(spec.class_name, "TestMod1");
        assert_eq!(spec.method_name, "test_mod1");
    }

    #[test]
    fn test_derive_top_level_module() {
        let spec = StubSpec::from_module(Path::new("/proj"), Path::new("/proj/app.py"), ".py");
        assert_eq!(spec.import_path, "app");
        assert_eq!(spec.class_name, "TestApp");
    }

    #[test]
    fn test_capitalize_lowers_tail() {
        assert_eq!(capitalize("myModule"), "Mymodule");
        assert_eq!(capitalize("x"), "X");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_render_template() {
        let spec = StubSpec::from_module(Path::new("/p"), Path::new("/p/a/mod1.py"), ".py");
        let expected = "import unittest\n\
                        from a.mod1 import *\n\
                        \n\
                        class TestMod1(unittest.TestCase):\n    \
                        def test_mod1(self):\n        \
                        # TODO: implement test case\n        \
                        pass\n\
                        \n\
                        if __name__ == '__main__':\n    \
                        unittest.main()\n";
        assert_eq!(spec.render(), expected);
    }

    #[test]
    fn test_write_stub_is_write_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("test_mod1.py");
        let spec = StubSpec::from_module(temp.path(), &temp.path().join("mod1.py"), ".py");

        assert_eq!(write_stub(&path, &spec).unwrap(), StubOutcome::Created);
        std::fs::write(&path, "# mine\n").unwrap();
        assert_eq!(write_stub(&path, &spec).unwrap(), StubOutcome::Kept);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
    }

    #[test]
    fn test_write_stub_missing_parent_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope").join("test_x.py");
        let spec = StubSpec::from_module(temp.path(), &temp.path().join("x.py"), ".py");
        assert!(matches!(
            write_stub(&path, &spec),
            Err(MirrorError::Filesystem {
                op: FsOp::CreateFile,
                ..
            })
        ));
    }

    proptest! {
        #[test]
        fn prop_names_follow_convention(
            dirs in prop::collection::vec("[a-z][a-z0-9_]{0,6}", 0..4),
            name in "[A-Za-z][A-Za-z0-9_]{0,10}",
        ) {
            let mut path = std::path::PathBuf::from("/root");
            for d in &dirs {
                path.push(d);
            }
            path.push(format!("{name}.py"));

            let spec = StubSpec::from_module(Path::new("/root"), &path, ".py");
            let mut expected: Vec<String> = dirs.clone();
            expected.push(name.clone());

            prop_assert_eq!(spec.import_path, expected.join("."));
            prop_assert_eq!(spec.method_name, format!("test_{}", name.to_lowercase()));
            prop_assert!(spec.class_name.starts_with("Test"));
            prop_assert_eq!(spec.class_name.to_lowercase(), format!("test{}", name.to_lowercase()));
        }
    }
}
