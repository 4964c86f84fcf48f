//! Optional Slack incoming-webhook notification.
//!
//! Delivery is best effort: failures are logged and never propagated, and
//! nothing is retried. With no webhook configured the notifier is simply
//! absent.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

pub const WEBHOOK_ENV_VAR: &str = "SLACK_WEBHOOK_URL";

pub struct Notifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    /// Reads the webhook URL from the environment; absence (or an empty
    /// value) silently disables notification.
    pub fn from_env() -> Option<Self> {
        std::env::var(WEBHOOK_ENV_VAR)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(Self::new)
    }

    /// Posts one titled message as a Slack attachment field.
    pub async fn notify(&self, title: &str, value: &str) {
        let payload = json!({
            "attachments": [{
                "fallback": "",
                "pretext": "",
                "color": "#f4f4f4",
                "fields": [{ "title": title, "value": value, "short": false }],
            }]
        });

        match self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(status = %response.status(), "webhook delivered");
            }
            Ok(response) => {
                warn!(status = %response.status(), "webhook delivery rejected");
            }
            Err(err) => {
                warn!(error = %err, "webhook delivery failed");
            }
        }
    }
}
