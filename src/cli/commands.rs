use std::path::Path;
use std::time::Duration;

use crate::aggregate::aggregator::{Aggregator, deliver};
use crate::aggregate::summary::RunSummary;
use crate::notify::error::NotifyError;
use crate::notify::lark::LarkWebhook;
use crate::notify::notifier::{DryRunNotifier, Notification, Notifier};
use crate::report::console::format_console_report;
use crate::report::parser::parse_file;
use crate::runner::apifox::{ApifoxCli, ApifoxSettings};
use crate::runner::runner_model::{ReportHandle, SuiteRunner};
use crate::trace::logger::TraceLogger;

// ============================================================================
// Notification target
// ============================================================================

/// Where the summary notification goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    Webhook { url: String, timeout: Option<Duration> },
    DryRun,
    Disabled,
}

impl NotifyTarget {
    /// `--dry-run` wins over a webhook URL; no URL means no notification.
    pub fn resolve(webhook: Option<String>, dry_run: bool, timeout_secs: Option<u64>) -> Self {
        match (dry_run, webhook) {
            (true, _) => NotifyTarget::DryRun,
            (false, Some(url)) => NotifyTarget::Webhook {
                url,
                timeout: timeout_secs.map(Duration::from_secs),
            },
            (false, None) => NotifyTarget::Disabled,
        }
    }
}

/// Build the notifier for a target. `Disabled` yields `None`.
pub fn build_notifier(target: &NotifyTarget) -> Result<Option<Box<dyn Notifier>>, NotifyError> {
    let notifier: Box<dyn Notifier> = match target {
        NotifyTarget::Webhook { url, timeout: Some(t) } => {
            Box::new(LarkWebhook::with_timeout(url, *t)?)
        }
        NotifyTarget::Webhook { url, timeout: None } => Box::new(LarkWebhook::new(url)),
        NotifyTarget::DryRun => Box::new(DryRunNotifier),
        NotifyTarget::Disabled => return Ok(None),
    };
    Ok(Some(notifier))
}

// ============================================================================
// run subcommand
// ============================================================================

/// Result of one full run: the summary, and the delivery outcome when a
/// notifier was configured.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub delivery: Option<Result<(), NotifyError>>,
}

impl RunOutcome {
    /// Every case passed and the notification, if any, went out.
    pub fn succeeded(&self) -> bool {
        self.summary.is_success() && !matches!(self.delivery, Some(Err(_)))
    }
}

/// Run suites with any runner, then notify once.
pub fn run_suites<R: SuiteRunner>(
    runner: R,
    suites: &[String],
    notifier: Option<&dyn Notifier>,
    tracer: TraceLogger,
) -> RunOutcome {
    let mut aggregator = Aggregator::new(runner).with_tracer(tracer);
    let summary = aggregator.run_all(suites);
    let delivery = notifier.map(|n| deliver(&summary, n));
    RunOutcome { summary, delivery }
}

/// Run the configured suites through the Apifox CLI. Returns whether every
/// case passed and the notification was delivered.
///
/// An empty suite list still produces a (zero-case) summary and notification.
pub fn cmd_run(
    suites: &[String],
    settings: ApifoxSettings,
    target: &NotifyTarget,
    trace_file: Option<&str>,
) -> Result<bool, Box<dyn std::error::Error>> {
    if suites.is_empty() {
        tracing::warn!("no suites configured; reporting an empty run");
    }

    let notifier = build_notifier(target)?;
    if notifier.is_none() {
        tracing::warn!("no webhook configured; the summary will only be printed");
    }

    let outcome = run_suites(
        ApifoxCli::new(settings),
        suites,
        notifier.as_deref(),
        tracer_for(trace_file),
    );

    print!("{}", format_console_report(&outcome.summary));
    Ok(outcome.succeeded())
}

// ============================================================================
// analyse / card subcommands
// ============================================================================

/// Fold existing report files. Relative names are looked up in `report_dir`;
/// unusable reports are logged and skipped.
pub fn summarize_reports(report_dir: &Path, reports: &[String]) -> RunSummary {
    reports.iter().fold(RunSummary::new(), |summary, name| {
        let handle = ReportHandle::resolve(report_dir, name);
        match parse_file(handle.path()) {
            Ok(parsed) => summary.fold(parsed),
            Err(e) => {
                tracing::warn!(report = %name, error = %e, "report unusable; skipping");
                summary.with_skipped(name, e)
            }
        }
    })
}

/// Summarize reports offline; optionally notify. Returns whether every case
/// passed and the notification, if requested, was delivered.
pub fn cmd_analyse(
    report_dir: &Path,
    reports: &[String],
    target: &NotifyTarget,
) -> Result<bool, Box<dyn std::error::Error>> {
    let summary = summarize_reports(report_dir, reports);
    print!("{}", format_console_report(&summary));

    let delivered = match build_notifier(target)? {
        Some(notifier) => deliver(&summary, notifier.as_ref()).is_ok(),
        None => true,
    };
    Ok(summary.is_success() && delivered)
}

/// Print the card JSON the reports would produce.
pub fn cmd_card(report_dir: &Path, reports: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let summary = summarize_reports(report_dir, reports);
    DryRunNotifier.notify(&Notification::from_summary(&summary))?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn tracer_for(trace_file: Option<&str>) -> TraceLogger {
    match trace_file {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    }
}
