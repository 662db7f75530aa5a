use crate::aggregate::summary::RunSummary;
use crate::notify::card::build_card;
use crate::notify::error::NotifyError;
use crate::report::report_model::FailureMap;

/// Everything the chat notification needs from one aggregation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification<'a> {
    pub message: String,
    pub report_urls: &'a [String],
    pub is_success: bool,
    pub failures: &'a FailureMap,
}

impl<'a> Notification<'a> {
    pub fn from_summary(summary: &'a RunSummary) -> Self {
        Self {
            message: summary.headline(),
            report_urls: &summary.report_urls,
            is_success: summary.is_success(),
            failures: &summary.failures,
        }
    }
}

/// Delivers a notification somewhere: a chat webhook, stdout, a test double.
pub trait Notifier {
    fn notify(&self, notification: &Notification<'_>) -> Result<(), NotifyError>;
}

/// Prints the card JSON instead of sending it.
pub struct DryRunNotifier;

impl Notifier for DryRunNotifier {
    fn notify(&self, notification: &Notification<'_>) -> Result<(), NotifyError> {
        let card = build_card(notification);
        println!("{}", serde_json::to_string_pretty(&card)?);
        Ok(())
    }
}
