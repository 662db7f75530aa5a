use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::runner::error::RunnerError;

/// Runs one suite and reports where its JSON report was written.
pub trait SuiteRunner {
    fn run_suite(&mut self, suite: &str) -> Result<SuiteRun, RunnerError>;
}

impl<R: SuiteRunner + ?Sized> SuiteRunner for &mut R {
    fn run_suite(&mut self, suite: &str) -> Result<SuiteRun, RunnerError> {
        (**self).run_suite(suite)
    }
}

/// Outcome of one successful invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRun {
    pub report: ReportHandle,

    /// Report links seen in the runner's streamed output
    pub report_urls: Vec<String>,
}

impl SuiteRun {
    pub fn new(report: ReportHandle) -> Self {
        Self {
            report,
            report_urls: Vec::new(),
        }
    }

    pub fn with_report_urls(mut self, urls: Vec<String>) -> Self {
        self.report_urls = urls;
        self
    }
}

/// Location of a generated JSON report. Always ends in `.json`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportHandle(PathBuf);

impl ReportHandle {
    /// Appends `.json` when the path does not already end with it. Report
    /// stems may contain dots, so the extension is appended, never replaced.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.extension().is_some_and(|ext| ext == "json") {
            return Self(path);
        }
        let mut raw = OsString::from(path);
        raw.push(".json");
        Self(PathBuf::from(raw))
    }

    /// A report named `stem` inside `report_dir`.
    pub fn in_dir(report_dir: &Path, stem: &str) -> Self {
        Self::new(report_dir.join(stem))
    }

    /// A report named on the command line: relative names live in
    /// `report_dir`, absolute paths are taken as given.
    pub fn resolve(report_dir: &Path, name: &str) -> Self {
        let path = Path::new(name);
        if path.is_absolute() {
            Self::new(path)
        } else {
            Self::in_dir(report_dir, name)
        }
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

// ============================================================================
// Report stems: unique `--out-file` names within one process
// ============================================================================

pub const REPORT_STEM_PREFIX: &str = "apifox-report-";

/// Hands out `apifox-report-<timestamp>` names, suffixing `-2`, `-3`, ... when
/// two suites start within the same second.
#[derive(Debug, Default)]
pub struct ReportStems {
    used: HashSet<String>,
}

impl ReportStems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, started_at: NaiveDateTime) -> String {
        let base = format!(
            "{}{}",
            REPORT_STEM_PREFIX,
            started_at.format("%Y-%m-%d_%H-%M-%S")
        );
        let mut stem = base.clone();
        let mut n = 1;
        while self.used.contains(&stem) {
            n += 1;
            stem = format!("{}-{}", base, n);
        }
        self.used.insert(stem.clone());
        stem
    }
}
