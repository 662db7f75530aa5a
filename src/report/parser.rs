use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::report::document::{FailureEntry, ReportDocument, Step};
use crate::report::error::{ParseError, ReportError};
use crate::report::report_model::{FailureMap, ParsedReport};

// ============================================================================
// Step index: step id → (case name, endpoint path)
// ============================================================================

#[derive(Debug, Default)]
pub struct StepIndex<'a> {
    by_id: HashMap<&'a str, (&'a str, &'a str)>,
}

impl<'a> StepIndex<'a> {
    /// Later steps with a repeated id replace earlier ones.
    pub fn build(steps: &[Step<'a>]) -> Self {
        let by_id = steps
            .iter()
            .map(|step| (step.id, (step.name, step.endpoint_path)))
            .collect();
        Self { by_id }
    }

    pub fn resolve(&self, step_ref: &str) -> Option<(&'a str, &'a str)> {
        self.by_id.get(step_ref).copied()
    }
}

/// Join failure entries to their steps and record them under the case name.
///
/// Entries whose reference has no matching step are dropped. Returns how many
/// were dropped.
pub fn correlate(
    index: &StepIndex<'_>,
    entries: &[FailureEntry<'_>],
    suite_name: &str,
    failures: &mut FailureMap,
) -> usize {
    let mut dropped = 0;
    for (position, entry) in entries.iter().enumerate() {
        match entry.step_ref.and_then(|step_ref| index.resolve(step_ref)) {
            Some((case_name, endpoint_path)) => {
                failures.record(case_name, suite_name, endpoint_path, entry.error_message);
            }
            None => {
                dropped += 1;
                tracing::debug!(
                    suite = suite_name,
                    position,
                    step_ref = entry.step_ref.unwrap_or("<none>"),
                    "failure entry references no known step; dropped"
                );
            }
        }
    }
    dropped
}

// ============================================================================
// Report parsing
// ============================================================================

/// Extract counts, failure detail and report links from one report document.
///
/// The `failures` section is only inspected when the report counts at least
/// one failed request.
pub fn parse(document: &Value) -> Result<ParsedReport, ParseError> {
    let doc = ReportDocument::new(document);

    let stats = doc.stats()?;
    let report_urls = doc.report_urls();
    let suite_name = doc.suite_name();

    let steps = doc.steps();
    let index = StepIndex::build(&steps);

    let mut failures = FailureMap::new();
    if stats.failed > 0 {
        let entries = doc.failures()?;
        let dropped = correlate(&index, &entries, suite_name, &mut failures);
        if dropped > 0 {
            tracing::debug!(suite = suite_name, dropped, "uncorrelated failure entries");
        }
    }

    Ok(ParsedReport {
        suite_name: suite_name.to_string(),
        total: stats.total,
        failed: stats.failed,
        failures,
        report_urls,
    })
}

/// Read and decode a report file.
pub fn load_report(path: &Path) -> Result<Value, ReportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ReportError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and parse a report file in one go.
pub fn parse_file(path: &Path) -> Result<ParsedReport, ReportError> {
    let document = load_report(path)?;
    parse(&document).map_err(|source| ReportError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
