//! Coverage configuration emitter.

use crate::error::{FsOp, MirrorError, Result};
use crate::ignore::IgnoreSet;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

/// Default coverage configuration file name.
pub const DEFAULT_COVERAGERC: &str = ".coveragerc";

/// Render the `[run]` omit section for `set`, patterns sorted and verbatim.
#[must_use]
pub fn render_coveragerc(set: &IgnoreSet) -> String {
    let mut out = String::from("[run]\nomit =\n");
    for pattern in set.patterns() {
        let _ = writeln!(out, "    {pattern}");
    }
    out
}

/// Write the coverage configuration, replacing any existing file.
pub fn write_coveragerc(path: &Path, set: &IgnoreSet) -> Result<()> {
    std::fs::write(path, render_coveragerc(set))
        .map_err(|e| MirrorError::fs(FsOp::Write, path, e))?;
    info!(path = %path.display(), patterns = set.len(), "wrote coverage config");
    Ok(())
}
