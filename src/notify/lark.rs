use std::time::Duration;

use serde::Deserialize;

use crate::notify::card::build_card;
use crate::notify::error::NotifyError;
use crate::notify::notifier::{Notification, Notifier};

/// Posts cards to a Lark/Feishu custom bot webhook.
pub struct LarkWebhook {
    pub url: String,
    client: reqwest::blocking::Client,
}

impl LarkWebhook {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

/// Bot reply. Older endpoints answer with `StatusCode`/`StatusMessage`.
#[derive(Debug, Deserialize)]
struct WebhookReply {
    #[serde(default, alias = "StatusCode")]
    code: Option<i64>,
    #[serde(default, alias = "StatusMessage")]
    msg: Option<String>,
}

/// Delivery succeeded only on HTTP 200 with `code == 0` in the body.
pub fn check_response(status: u16, body: &str) -> Result<(), NotifyError> {
    if status != 200 {
        return Err(NotifyError::Status {
            status,
            body: body.to_string(),
        });
    }
    let reply: WebhookReply =
        serde_json::from_str(body).map_err(|_| NotifyError::Body(body.to_string()))?;
    match reply.code {
        Some(0) => Ok(()),
        Some(code) => Err(NotifyError::Rejected {
            code,
            msg: reply.msg.unwrap_or_default(),
        }),
        None => Err(NotifyError::Body(body.to_string())),
    }
}

impl Notifier for LarkWebhook {
    fn notify(&self, notification: &Notification<'_>) -> Result<(), NotifyError> {
        let card = build_card(notification);
        let response = self.client.post(&self.url).json(&card).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        tracing::debug!(status, body = %body, "webhook response");
        check_response(status, &body)
    }
}
