//! Notification delivery used by the email capability.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification. Returns a confirmation identifier when the
    /// channel provides one.
    async fn send(&self, subject: &str, message: &str) -> Result<Option<String>, ActionError>;
}

/// Notifier that only records the notification in the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, subject: &str, message: &str) -> Result<Option<String>, ActionError> {
        tracing::info!(subject = %subject, message_len = message.len(), "Notification sent");
        Ok(None)
    }
}

/// Notifier that posts `{subject, message}` JSON to a webhook.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    message: &'a str,
}

#[derive(Deserialize)]
struct WebhookReceipt {
    id: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ActionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ActionError::Config(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, subject: &str, message: &str) -> Result<Option<String>, ActionError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { subject, message })
            .send()
            .await
            .map_err(|e| ActionError::DownstreamUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActionError::DownstreamUnavailable(format!(
                "notification webhook returned {}",
                status
            )));
        }

        // A receipt is optional; an empty or non-JSON body still means delivered.
        let body = response.text().await.unwrap_or_default();
        let receipt = serde_json::from_str::<WebhookReceipt>(&body)
            .ok()
            .and_then(|r| r.id);
        tracing::info!(subject = %subject, receipt = ?receipt, "Notification delivered");
        Ok(receipt)
    }
}
