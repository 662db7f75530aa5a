use crate::aggregate::summary::RunSummary;
use crate::notify::error::NotifyError;
use crate::notify::notifier::{Notification, Notifier};
use crate::report::parser::parse_file;
use crate::runner::runner_model::{SuiteRun, SuiteRunner};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::{SuiteEvent, SuiteStage};

/// Runs every suite through a [`SuiteRunner`] and folds their reports.
///
/// All suites are invoked first, in order; their reports are then parsed in
/// the same order. A suite whose invocation or report fails is skipped and
/// never stops the rest of the run.
pub struct Aggregator<R: SuiteRunner> {
    runner: R,
    tracer: TraceLogger,
}

impl<R: SuiteRunner> Aggregator<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            tracer: TraceLogger::disabled(),
        }
    }

    pub fn with_tracer(mut self, tracer: TraceLogger) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn run_all(&mut self, suites: &[String]) -> RunSummary {
        let mut summary = RunSummary::new();

        let mut runs: Vec<(&str, SuiteRun)> = Vec::with_capacity(suites.len());
        for suite in suites {
            match self.runner.run_suite(suite) {
                Ok(run) => {
                    self.tracer.log(
                        &SuiteEvent::now(suite, SuiteStage::Invoke)
                            .with_report(run.report.path().display()),
                    );
                    runs.push((suite.as_str(), run));
                }
                Err(e) => {
                    tracing::warn!(suite = %suite, error = %e, "suite invocation failed; skipping");
                    self.tracer
                        .log(&SuiteEvent::now(suite, SuiteStage::Invoke).with_error(&e));
                    summary = summary.with_skipped(suite, e);
                }
            }
        }

        for (suite, run) in runs {
            summary = self.fold_run(summary, suite, run);
        }

        tracing::info!(
            total = summary.total_cases,
            failed = summary.total_failures,
            failing_cases = summary.failures.len(),
            skipped = summary.skipped.len(),
            "aggregation complete"
        );
        summary
    }

    /// Streamed links come first; links in the report that were already
    /// streamed for this suite are not repeated.
    fn fold_run(&self, summary: RunSummary, suite: &str, run: SuiteRun) -> RunSummary {
        let SuiteRun {
            report,
            report_urls: streamed,
        } = run;
        let summary = summary.with_report_urls(streamed.iter().cloned());

        let event = SuiteEvent::now(suite, SuiteStage::Parse).with_report(report.path().display());
        match parse_file(report.path()) {
            Ok(mut parsed) => {
                tracing::info!(
                    suite = %suite,
                    name = %parsed.suite_name,
                    total = parsed.total,
                    failed = parsed.failed,
                    "report parsed"
                );
                self.tracer.log(&event.with_counts(parsed.total, parsed.failed));
                parsed.report_urls.retain(|url| !streamed.contains(url));
                summary.fold(parsed)
            }
            Err(e) => {
                tracing::warn!(suite = %suite, error = %e, "report unusable; skipping");
                self.tracer.log(&event.with_error(&e));
                summary.with_skipped(suite, e)
            }
        }
    }
}

/// Hand the summary to the notifier. Failures are logged and returned; the
/// summary itself is untouched.
pub fn deliver(summary: &RunSummary, notifier: &dyn Notifier) -> Result<(), NotifyError> {
    let notification = Notification::from_summary(summary);
    match notifier.notify(&notification) {
        Ok(()) => {
            tracing::info!("notification sent");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to send notification");
            Err(e)
        }
    }
}
