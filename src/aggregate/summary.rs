use serde::Serialize;

use crate::report::report_model::{FailureMap, ParsedReport};

// ============================================================================
// Run summary: the cross-suite accumulator
// ============================================================================

/// A suite that contributed nothing to the totals, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedSuite {
    pub suite: String,
    pub reason: String,
}

/// Totals, report links and merged failure detail across every report of a
/// run. Built by folding [`ParsedReport`]s in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_cases: u64,
    pub total_failures: u64,
    pub report_urls: Vec<String>,
    pub failures: FailureMap,
    pub skipped: Vec<SkippedSuite>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one report: counts summed, links appended, failures merged.
    pub fn fold(mut self, report: ParsedReport) -> Self {
        self.total_cases += report.total;
        self.total_failures += report.failed;
        self.report_urls.extend(report.report_urls);
        self.failures.merge(report.failures);
        self
    }

    pub fn with_report_urls(mut self, urls: impl IntoIterator<Item = String>) -> Self {
        self.report_urls.extend(urls);
        self
    }

    pub fn with_skipped(mut self, suite: &str, reason: impl ToString) -> Self {
        self.skipped.push(SkippedSuite {
            suite: suite.to_string(),
            reason: reason.to_string(),
        });
        self
    }

    pub fn is_success(&self) -> bool {
        self.total_failures == 0
    }

    /// The notification headline, e.g. `共测试接口用例10条，全部成功！\n`.
    pub fn headline(&self) -> String {
        let mut message = format!("共测试接口用例{}条", self.total_cases);
        if self.is_success() {
            message.push_str(SUCCESS_SUFFIX);
        } else {
            message.push_str(&format!("，失败{}条，失败的用例如下:\n", self.total_failures));
        }
        message
    }
}

pub const SUCCESS_SUFFIX: &str = "，全部成功！\n";

/// Fold reports that were already parsed, in the given order.
pub fn aggregate(reports: impl IntoIterator<Item = ParsedReport>) -> RunSummary {
    reports.into_iter().fold(RunSummary::new(), RunSummary::fold)
}
