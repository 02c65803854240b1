//! Error types for `testmirror`.
//!
//! Only fatal conditions are errors. An absent optional input (ignore
//! file, submodule declarations, package data) is logged and resolved as
//! an empty contribution, and self-referential paths are excluded
//! silently.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mirroring operations.
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Filesystem operation that failed, kept for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    /// Listing a directory
    ReadDir,
    /// Resolving a path to its canonical form
    Canonicalize,
    /// Creating a directory
    CreateDir,
    /// Creating or touching a file
    CreateFile,
    /// Writing file contents
    Write,
    /// Reading file contents
    Read,
    /// Copying a file
    Copy,
}

impl fmt::Display for FsOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadDir => "read directory",
            Self::Canonicalize => "resolve path",
            Self::CreateDir => "create directory",
            Self::CreateFile => "create file",
            Self::Write => "write file",
            Self::Read => "read file",
            Self::Copy => "copy file",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while building the test structure.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Missing or invalid configuration; raised before any filesystem mutation
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// A filesystem call failed
    #[error("Failed to {op} '{}': {source}", path.display())]
    Filesystem {
        /// Operation in progress
        op: FsOp,
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A directory resolves to one of its own ancestors
    #[error("Symlink cycle: '{}' resolves to ancestor '{}'", path.display(), target.display())]
    SymlinkCycle {
        /// Path as reached by the walk
        path: PathBuf,
        /// Canonical ancestor it points back to
        target: PathBuf,
    },

    /// Manifest encode/decode failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MirrorError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the operation and path it came from
    #[must_use]
    pub fn fs(op: FsOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    /// Whether this error was raised before touching the filesystem
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_config() {
        let err = MirrorError::config("missing required field 'test_dir'");
        assert_eq!(
            err.to_string(),
            "Configuration error: missing required field 'test_dir'"
        );
        assert!(err.is_config());
    }

    #[test]
    fn error_display_filesystem_includes_op_and_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = MirrorError::fs(FsOp::CreateDir, "/tmp/_tests/a", io);
        let msg = err.to_string();
        assert!(msg.contains("create directory"));
        assert!(msg.contains("/tmp/_tests/a"));
        assert!(msg.contains("denied"));
        assert!(!err.is_config());
    }

    #[test]
    fn error_display_symlink_cycle() {
        let err = MirrorError::SymlinkCycle {
            path: PathBuf::from("/p/a/loop"),
            target: PathBuf::from("/p/a"),
        };
        assert!(err.to_string().contains("Symlink cycle"));
        assert!(err.to_string().contains("/p/a/loop"));
    }

    #[test]
    fn filesystem_error_keeps_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = MirrorError::fs(FsOp::Read, "x", io);
        assert!(err.source().is_some());
    }
}
