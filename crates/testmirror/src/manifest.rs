//! Stub-to-module path manifest.
//!
//! # Format
//!
//! A JSON object mapping each absolute stub path to the absolute module
//! path it was generated from, e.g.
//!
//! ```json
//! {
//!     "/proj/_tests/a/test_mod1.py": "/proj/a/mod1.py"
//! }
//! ```
//!
//! Keys are kept sorted and the file is rebuilt from scratch on every run,
//! so identical inputs produce an identical file.

use crate::context::to_slash;
use crate::error::{FsOp, MirrorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default manifest file name.
pub const DEFAULT_MANIFEST_NAME: &str = "module_paths.json";

/// Mapping from stub path to module path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    entries: BTreeMap<String, String>,
}

impl Manifest {
    /// Create an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stub and the module it mirrors.
    pub fn insert(&mut self, stub: &Path, module: &Path) {
        self.entries.insert(to_slash(stub), to_slash(module));
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the manifest has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Module path recorded for a stub.
    #[must_use]
    pub fn get(&self, stub: &str) -> Option<&str> {
        self.entries.get(stub).map(String::as_str)
    }

    /// Iterate `(stub, module)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as pretty JSON with a four-space indent.
    pub fn to_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        // serde_json only emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Write manifest to file, replacing any previous contents.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| MirrorError::fs(FsOp::Write, path, e))
    }

    /// Read manifest from file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn read(path: &Path) -> Result<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| MirrorError::fs(FsOp::Read, path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}
