//! Terminal output for humans

use console::{style, Term};
use testmirror::StructureReport;

/// Styled status lines on stderr
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    fn line(&self, symbol: &str, plain: &str, color: fn(&str) -> String, message: &str) {
        let prefix = if self.use_color {
            color(symbol)
        } else {
            plain.to_string()
        };
        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.line("✓", "OK", |s| style(s).green().bold().to_string(), message);
        }
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // shown even in quiet mode
        self.line("✗", "FAIL", |s| style(s).red().bold().to_string(), message);
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.line("⚠", "WARN", |s| style(s).yellow().bold().to_string(), message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.line("ℹ", "INFO", |s| style(s).blue().bold().to_string(), message);
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the result of a structure run
    pub fn structure_summary(&self, report: &StructureReport) {
        if self.quiet {
            return;
        }
        self.header("Test structure");
        for (key, value) in summary_fields(report) {
            let key = if self.use_color {
                style(format!("{key:>12}")).dim().to_string()
            } else {
                format!("{key:>12}")
            };
            let _ = self.term.write_line(&format!("{key}  {value}"));
        }
        for missing in &report.assets.missing {
            self.warning(&format!("asset not found: {}", missing.display()));
        }
    }
}

/// Key/value lines describing a structure run
#[must_use]
pub fn summary_fields(report: &StructureReport) -> Vec<(&'static str, String)> {
    let m = &report.mirror;
    vec![
        ("project", report.project_dir.display().to_string()),
        ("test tree", report.test_root.display().to_string()),
        ("patterns", report.ignore.len().to_string()),
        (
            "directories",
            format!("{} mirrored, {} pruned", m.dirs_mirrored, m.dirs_pruned),
        ),
        (
            "stubs",
            format!("{} created, {} kept", m.stubs_created, m.stubs_kept),
        ),
        ("assets", format!("{} copied", report.assets.copied.len())),
        ("manifest", report.manifest_path.display().to_string()),
        ("coverage", report.coveragerc_path.display().to_string()),
    ]
}
