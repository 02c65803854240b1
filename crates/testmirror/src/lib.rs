//! testmirror: mirror a Python source tree into a test tree
//!
//! Walks a project, applies layered ignore rules and builds an isomorphic
//! test tree: a package marker per mirrored directory, one write-once
//! stub per module, a stub-to-module manifest and a coverage omit list.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ IgnoreSet    │──►│ Path         │──►│ TreeWalker   │──►│ Mirror       │
//! │ ::resolve    │   │ Classifier   │   │ (DirVisit)   │   │ stubs + mfst │
//! └──────┬───────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!        │
//!        └──────────► .coveragerc
//! ```
//!
//! [`create_structure`] runs the whole pipeline for a [`StructureConfig`].

#![warn(missing_docs)]

pub mod assets;
pub mod classifier;
pub mod context;
pub mod coverage;
mod error;
pub mod ignore;
pub mod manifest;
pub mod structure;
pub mod stub;
pub mod walker;

pub use assets::{install_project_assets, AssetReport, REPORTS_DIR};
pub use classifier::PathClassifier;
pub use context::{check_test_dir, current_exe_name, MirrorContext};
pub use coverage::{render_coveragerc, write_coveragerc};
pub use error::{FsOp, MirrorError, Result};
pub use ignore::{IgnorePattern, IgnoreSet, IgnoreSources, PatternKind};
pub use manifest::{Manifest, DEFAULT_MANIFEST_NAME};
pub use structure::{create_structure, StructureConfig, StructureReport};
pub use stub::{write_stub, StubOutcome, StubSpec};
pub use walker::{DirVisit, Mirror, MirrorReport, TreeWalker};
