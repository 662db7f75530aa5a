use thiserror::Error;

/// Delivering the summary notification failed. The run's results are
/// unaffected.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("webhook rejected the message (code {code}): {msg}")]
    Rejected { code: i64, msg: String },

    #[error("unexpected webhook response body: {0}")]
    Body(String),

    #[error("failed to serialize card: {0}")]
    Serialize(#[from] serde_json::Error),
}
