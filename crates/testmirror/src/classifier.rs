//! Path classification against a resolved [`IgnoreSet`].

use crate::context::to_slash;
use crate::ignore::{IgnoreSet, PatternKind};
use glob::{MatchOptions, Pattern};
use std::path::{Path, PathBuf};
use tracing::warn;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug)]
enum Rule {
    Glob {
        source: String,
        pattern: Pattern,
        basename: bool,
    },
    Literal {
        source: String,
        path: String,
        basename: bool,
    },
}

impl Rule {
    fn compile(raw: &str, kind: PatternKind) -> Option<Self> {
        let anchored = raw.starts_with('/');
        let text = raw.trim_start_matches('/').trim_start_matches("./");
        let text = text.trim_end_matches('/');
        if text.is_empty() {
            return None;
        }
        let basename = !anchored && !text.contains('/');

        match kind {
            PatternKind::Literal => Some(Self::Literal {
                source: raw.to_string(),
                path: text.to_string(),
                basename: false,
            }),
            PatternKind::Glob => match Pattern::new(text) {
                Ok(pattern) => Some(Self::Glob {
                    source: raw.to_string(),
                    pattern,
                    basename,
                }),
                Err(e) => {
                    warn!(pattern = %raw, error = %e, "invalid glob, matching literally");
                    Some(Self::Literal {
                        source: raw.to_string(),
                        path: text.to_string(),
                        basename,
                    })
                }
            },
        }
    }

    fn source(&self) -> &str {
        match self {
            Self::Glob { source, .. } | Self::Literal { source, .. } => source,
        }
    }

    fn matches(&self, rel: &str, name: &str) -> bool {
        match self {
            Self::Glob {
                pattern, basename, ..
            } => {
                pattern.matches_with(rel, MATCH_OPTIONS)
                    || (*basename && pattern.matches_with(name, MATCH_OPTIONS))
            }
            Self::Literal { path, basename, .. } => {
                rel == path
                    || rel
                        .strip_prefix(path.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
                    || (*basename && name == path)
            }
        }
    }
}

/// Decides whether a path is excluded from mirroring.
///
/// Patterns are compiled once. A path is excluded if any pattern matches
/// its base-relative form; there is no negation or precedence.
#[derive(Debug)]
pub struct PathClassifier {
    rules: Vec<Rule>,
    base_dir: PathBuf,
    self_name: Option<String>,
}

impl PathClassifier {
    /// Compile `set` for paths under `base_dir`.
    #[must_use]
    pub fn new(set: &IgnoreSet, base_dir: impl Into<PathBuf>, self_name: Option<&str>) -> Self {
        let rules = set
            .iter()
            .filter_map(|p| Rule::compile(p.as_str(), p.kind()))
            .collect();
        Self {
            rules,
            base_dir: base_dir.into(),
            self_name: self_name.map(str::to_string),
        }
    }

    /// Whether `path` is excluded.
    #[must_use]
    pub fn is_excluded(&self, path: &Path) -> bool {
        self.matching_pattern(path).is_some() || self.is_self(path)
    }

    /// First pattern that excludes `path`, as written in its source.
    #[must_use]
    pub fn matching_pattern(&self, path: &Path) -> Option<&str> {
        let rel = path.strip_prefix(&self.base_dir).unwrap_or(path);
        let rel = to_slash(rel);
        let name = rel.rsplit('/').next().unwrap_or(rel.as_str());
        self.rules
            .iter()
            .find(|rule| rule.matches(&rel, name))
            .map(Rule::source)
    }

    fn is_self(&self, path: &Path) -> bool {
        match (&self.self_name, path.file_name()) {
            (Some(own), Some(name)) => name.to_string_lossy() == own.as_str(),
            _ => false,
        }
    }

    /// Base directory paths are made relative to
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
