//! Source tree traversal and mirroring.
//!
//! [`TreeWalker`] drives `walkdir` over the project and lazily yields one
//! [`DirVisit`] per retained directory, children before their parent.
//! [`Mirror`] consumes any sequence of visits and performs every
//! filesystem mutation, so mirroring can be exercised with synthetic
//! visits that never touch a real source tree.

use crate::classifier::PathClassifier;
use crate::context::{MirrorContext, PACKAGE_MARKER, STUB_PREFIX, VCS_DIR};
use crate::error::{FsOp, MirrorError, Result};
use crate::manifest::Manifest;
use crate::stub::{write_stub, StubOutcome, StubSpec};
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, FilterEntry, WalkDir};

/// One retained directory of the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirVisit {
    /// Directory path as reached by the walk
    pub dir: PathBuf,
    /// Path relative to the walk root (empty for the root itself)
    pub rel_dir: PathBuf,
    /// Retained subdirectory names, sorted
    pub subdirs: Vec<String>,
    /// Retained file names, sorted
    pub files: Vec<String>,
}

impl DirVisit {
    /// Visit with no retained entries.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, rel_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            rel_dir: rel_dir.into(),
            subdirs: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Whether nothing in this directory survived classification.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subdirs.is_empty() && self.files.is_empty()
    }
}

type EntryFilter<'a> = Box<dyn FnMut(&DirEntry) -> bool + 'a>;

/// Directory iterator with ignore rules, symlink following and a cycle guard.
///
/// Entries arrive from `walkdir` sorted by file name; a directory's visit is
/// complete once the walk leaves its subtree. The first error ends the walk.
pub struct TreeWalker<'a> {
    root: PathBuf,
    entries: FilterEntry<walkdir::IntoIter, EntryFilter<'a>>,
    open: Vec<DirVisit>,
    ready: VecDeque<DirVisit>,
    finished: bool,
}

impl fmt::Debug for TreeWalker<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeWalker")
            .field("root", &self.root)
            .field("open", &self.open.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<'a> TreeWalker<'a> {
    /// Walk `root`, skipping `.git` and everything `classifier` excludes.
    pub fn new(root: impl Into<PathBuf>, classifier: &'a PathClassifier) -> Self {
        let root = root.into();
        let entries = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(retain_filter(classifier));
        Self {
            root,
            entries,
            open: Vec::new(),
            ready: VecDeque::new(),
            finished: false,
        }
    }

    /// Move every visit at `depth` or deeper to the ready queue.
    fn close_to(&mut self, depth: usize) {
        while self.open.len() > depth {
            if let Some(visit) = self.open.pop() {
                self.ready.push_back(visit);
            }
        }
    }

    fn accept(&mut self, entry: &DirEntry) {
        let depth = entry.depth();
        self.close_to(depth);
        let name = entry.file_name().to_string_lossy().into_owned();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if let Some(parent) = self.open.last_mut() {
                parent.subdirs.push(name);
            }
            let rel_dir = entry
                .path()
                .strip_prefix(&self.root)
                .map_or_else(|_| entry.path().to_path_buf(), Path::to_path_buf);
            self.open.push(DirVisit::new(entry.path(), rel_dir));
        } else if file_type.is_file() {
            if let Some(parent) = self.open.last_mut() {
                parent.files.push(name);
            }
        }
    }

    /// Map a walk error; `None` means the entry is skipped.
    fn walk_error(&self, err: walkdir::Error) -> Option<MirrorError> {
        let path = err
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        if let Some(ancestor) = err.loop_ancestor() {
            return Some(MirrorError::SymlinkCycle {
                path,
                target: ancestor.to_path_buf(),
            });
        }
        let dangling = err.depth() > 0
            && err
                .io_error()
                .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
        if dangling {
            debug!(path = %path.display(), "dangling entry skipped");
            return None;
        }
        Some(MirrorError::fs(FsOp::ReadDir, path, io::Error::from(err)))
    }
}

/// Entry filter: `.git`, classifier exclusions and directory aliases.
fn retain_filter(classifier: &PathClassifier) -> EntryFilter<'_> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    Box::new(move |entry: &DirEntry| {
        let path = entry.path();
        let is_dir = entry.file_type().is_dir();
        if entry.depth() > 0 {
            if is_dir && entry.file_name() == VCS_DIR {
                return false;
            }
            if classifier.is_excluded(path) {
                debug!(path = %path.display(), "excluded");
                return false;
            }
        }
        if is_dir {
            if let Ok(canonical) = path.canonicalize() {
                if !seen.insert(canonical.clone()) {
                    warn!(
                        path = %path.display(),
                        target = %canonical.display(),
                        "directory already visited through another path, skipping"
                    );
                    return false;
                }
            }
        }
        true
    })
}

impl Iterator for TreeWalker<'_> {
    type Item = Result<DirVisit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(visit) = self.ready.pop_front() {
                return Some(Ok(visit));
            }
            if self.finished {
                return None;
            }
            match self.entries.next() {
                None => {
                    self.finished = true;
                    self.close_to(0);
                }
                Some(Ok(entry)) => self.accept(&entry),
                Some(Err(err)) => {
                    if let Some(e) = self.walk_error(err) {
                        self.finished = true;
                        self.open.clear();
                        self.ready.clear();
                        return Some(Err(e));
                    }
                }
            }
        }
    }
}

/// Counters and manifest produced by [`Mirror::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorReport {
    /// Directories yielded by the walk
    pub dirs_visited: usize,
    /// Directories mirrored into the test tree
    pub dirs_mirrored: usize,
    /// Directories with nothing retained, not mirrored
    pub dirs_pruned: usize,
    /// Stubs written this run
    pub stubs_created: usize,
    /// Existing stubs left untouched
    pub stubs_kept: usize,
    /// Stub-to-module mapping for every module seen
    pub manifest: Manifest,
}

/// Applies walk results to the test tree.
#[derive(Debug)]
pub struct Mirror<'a> {
    ctx: &'a MirrorContext,
}

impl<'a> Mirror<'a> {
    /// Mirror into `ctx`'s test tree.
    #[must_use]
    pub const fn new(ctx: &'a MirrorContext) -> Self {
        Self { ctx }
    }

    /// Consume `visits`, creating mirror directories, package markers and stubs.
    ///
    /// Stops at the first error.
    pub fn run<I>(&self, visits: I) -> Result<MirrorReport>
    where
        I: IntoIterator<Item = Result<DirVisit>>,
    {
        let _enter = self.ctx.span().enter();
        let test_root = self.ctx.test_root();
        let mut report = MirrorReport::default();

        for visit in visits {
            let visit = visit?;
            report.dirs_visited += 1;

            if visit.is_empty() {
                info!(dir = %visit.dir.display(), "nothing to mirror, pruned");
                report.dirs_pruned += 1;
                continue;
            }

            let mirror_dir = test_root.join(&visit.rel_dir);
            std::fs::create_dir_all(&mirror_dir)
                .map_err(|e| MirrorError::fs(FsOp::CreateDir, &mirror_dir, e))?;
            touch(&mirror_dir.join(PACKAGE_MARKER))?;
            report.dirs_mirrored += 1;

            for file in visit.files.iter().filter(|f| self.ctx.is_module(f)) {
                let module_path = visit.dir.join(file);
                let stub_path = mirror_dir.join(format!("{STUB_PREFIX}{file}"));
                let spec = StubSpec::from_module(
                    self.ctx.project_dir(),
                    &module_path,
                    self.ctx.module_suffix(),
                );
                match write_stub(&stub_path, &spec)? {
                    StubOutcome::Created => report.stubs_created += 1,
                    StubOutcome::Kept => report.stubs_kept += 1,
                }
                report.manifest.insert(&stub_path, &module_path);
            }
        }

        info!(
            mirrored = report.dirs_mirrored,
            pruned = report.dirs_pruned,
            created = report.stubs_created,
            kept = report.stubs_kept,
            "mirror complete"
        );
        Ok(report)
    }
}

/// Create `path` if missing without truncating existing content.
fn touch(path: &Path) -> Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(drop)
        .map_err(|e| MirrorError::fs(FsOp::CreateFile, path, e))
}
