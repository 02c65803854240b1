//! Ignore-rule resolution.
//!
//! Merges patterns from ignore files, submodule declarations and the
//! fixed self-referential exclusions into one deduplicated [`IgnoreSet`].

use crate::context::{MirrorContext, VCS_DIR};
use crate::error::{FsOp, MirrorError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default staging directory for hand-written tests.
pub const DEFAULT_STAGING_DIR: &str = "my_tests";

/// Default submodule declarations file name.
pub const DEFAULT_SUBMODULES_FILE: &str = ".gitmodules";

/// How a pattern is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PatternKind {
    /// Glob expression (`*`, `?`, `[...]`)
    Glob,
    /// Literal relative path, matched exactly or as a path prefix
    Literal,
}

/// A single ignore pattern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IgnorePattern {
    raw: String,
    kind: PatternKind,
}

impl IgnorePattern {
    /// Glob pattern
    #[must_use]
    pub fn glob(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: PatternKind::Glob,
        }
    }

    /// Literal path pattern
    #[must_use]
    pub fn literal(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            kind: PatternKind::Literal,
        }
    }

    /// Pattern text as written in its source
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matching kind
    #[must_use]
    pub const fn kind(&self) -> PatternKind {
        self.kind
    }
}

/// Deduplicated, order-irrelevant pattern set.
///
/// Backed by an ordered set so that anything rendered from it (coverage
/// omit list, logs) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    patterns: BTreeSet<IgnorePattern>,
}

impl IgnoreSet {
    /// Empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern; returns false if it was already present
    pub fn insert(&mut self, pattern: IgnorePattern) -> bool {
        self.patterns.insert(pattern)
    }

    /// Add several glob patterns
    pub fn extend_globs<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for p in patterns {
            self.insert(IgnorePattern::glob(p));
        }
    }

    /// Whether a pattern with this text is present, regardless of kind
    #[must_use]
    pub fn contains(&self, raw: &str) -> bool {
        self.patterns.iter().any(|p| p.raw == raw)
    }

    /// Number of patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterate patterns in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &IgnorePattern> {
        self.patterns.iter()
    }

    /// Distinct pattern texts in sorted order
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        let texts: BTreeSet<&str> = self.patterns.iter().map(IgnorePattern::as_str).collect();
        texts.into_iter().collect()
    }

    /// Build the merged set for a run.
    pub fn resolve(ctx: &MirrorContext, sources: &IgnoreSources) -> Result<Self> {
        let _enter = ctx.span().enter();
        let mut set = Self::new();

        for file in &sources.ignore_files {
            let path = resolve_against(ctx.project_dir(), file);
            if let Some(lines) = read_ignore_file(&path)? {
                debug!(path = %path.display(), count = lines.len(), "read ignore file");
                set.extend_globs(lines);
            }
        }

        if let Some(ref file) = sources.submodules_file {
            let path = resolve_against(ctx.project_dir(), file);
            for sub in read_submodule_paths(&path)? {
                debug!(path = %sub, "submodule excluded");
                set.insert(IgnorePattern::literal(sub));
            }
        }

        set.insert(IgnorePattern::glob(ctx.test_dir_name()));
        set.insert(IgnorePattern::glob(VCS_DIR));
        if let Some(ref staging) = sources.staging_dir {
            set.insert(IgnorePattern::glob(staging.clone()));
        }
        if let Some(ref manifest) = sources.manifest_name {
            set.insert(IgnorePattern::glob(manifest.clone()));
        }

        info!(patterns = set.len(), "resolved ignore patterns");
        Ok(set)
    }
}

/// Inputs to [`IgnoreSet::resolve`].
#[derive(Debug, Clone, Default)]
pub struct IgnoreSources {
    /// Ignore files; relative paths resolve against the project directory
    pub ignore_files: Vec<PathBuf>,
    /// Submodule declarations file, if any
    pub submodules_file: Option<PathBuf>,
    /// Staging directory for hand-written tests
    pub staging_dir: Option<String>,
    /// Manifest file name
    pub manifest_name: Option<String>,
}

impl IgnoreSources {
    /// Create empty sources
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an ignore file
    #[must_use]
    pub fn with_ignore_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ignore_files.push(path.into());
        self
    }

    /// Set the submodule declarations file
    #[must_use]
    pub fn with_submodules_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.submodules_file = Some(path.into());
        self
    }

    /// Exclude the staging directory
    #[must_use]
    pub fn with_staging_dir(mut self, name: impl Into<String>) -> Self {
        self.staging_dir = Some(name.into());
        self
    }

    /// Exclude the manifest file
    #[must_use]
    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = Some(name.into());
        self
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Extract patterns from ignore-file text: trimmed, no blanks, no `#` comments.
#[must_use]
pub fn parse_ignore_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Read an ignore file. A missing file yields `None` and a warning.
pub fn read_ignore_file(path: &Path) -> Result<Option<Vec<String>>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(parse_ignore_lines(&text))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "ignore file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(MirrorError::fs(FsOp::Read, path, e)),
    }
}

/// Extract `path` values from submodule declarations.
///
/// Accepts `[section]` headers and `key = value` / `key: value` lines;
/// keys are case-insensitive, `#` and `;` start comment lines. Lines
/// outside any section and malformed lines are ignored.
#[must_use]
pub fn parse_submodule_paths(text: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line.ends_with(']');
            continue;
        }
        if !in_section {
            continue;
        }
        let Some(idx) = line.find(['=', ':']) else {
            continue;
        };
        let (key, value) = (line[..idx].trim(), line[idx + 1..].trim());
        if key.eq_ignore_ascii_case("path") && !value.is_empty() {
            paths.push(value.trim_end_matches('/').to_string());
        }
    }
    paths
}

/// Read submodule declarations. A missing file contributes nothing.
pub fn read_submodule_paths(path: &Path) -> Result<Vec<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(parse_submodule_paths(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no submodule declarations");
            Ok(Vec::new())
        }
        Err(e) => Err(MirrorError::fs(FsOp::Read, path, e)),
    }
}
