use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Which phase of a suite's processing an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteStage {
    Invoke,
    Parse,
}

/// One line of the JSONL run trace.
#[derive(Debug, Serialize)]
pub struct SuiteEvent {
    pub timestamp_ms: u128,
    pub suite: String,
    pub stage: SuiteStage,
    pub ok: bool,

    pub report: Option<String>,
    pub total: Option<u64>,
    pub failed: Option<u64>,
    pub error: Option<String>,
}

impl SuiteEvent {
    pub fn now(suite: &str, stage: SuiteStage) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            suite: suite.to_string(),
            stage,
            ok: true,
            report: None,
            total: None,
            failed: None,
            error: None,
        }
    }

    pub fn with_report(mut self, report: impl ToString) -> Self {
        self.report = Some(report.to_string());
        self
    }

    pub fn with_counts(mut self, total: u64, failed: u64) -> Self {
        self.total = Some(total);
        self.failed = Some(failed);
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.ok = false;
        self.error = Some(error.to_string());
        self
    }
}
