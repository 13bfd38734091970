//! Alert Notification Sink
//!
//! Fire-and-forget operator alerts. Every alert lands in the structured log;
//! when a webhook URL is configured the alert is also POSTed as JSON from a
//! spawned task. Delivery failures are logged and dropped — a slow or dead
//! alert channel must never stall or fail an ingestion cycle, and the
//! breaker decision has already been made by the time an alert is dispatched.

use serde::Serialize;
use tracing::{error, info};

use crate::config::NotifyConfig;

/// JSON payload POSTed to the webhook.
#[derive(Debug, Clone, Serialize)]
struct AlertPayload {
    recipient: String,
    message: String,
}

/// Operator alert dispatcher. Clone-cheap.
#[derive(Clone)]
pub struct AlertSink {
    recipient: String,
    webhook_url: Option<String>,
    client: reqwest::Client,
}

impl AlertSink {
    pub fn from_config(config: &NotifyConfig) -> Self {
        let webhook_url = if config.webhook_url.trim().is_empty() {
            None
        } else {
            Some(config.webhook_url.clone())
        };
        if let Some(url) = &webhook_url {
            info!(url = %url, "Alert webhook configured");
        } else {
            info!("No alert webhook configured, alerts go to the log only");
        }
        Self {
            recipient: config.recipient.clone(),
            webhook_url,
            client: reqwest::Client::new(),
        }
    }

    /// Dispatch one alert and return immediately.
    ///
    /// Must be called from within a tokio runtime when a webhook is
    /// configured; the HTTP POST runs in a detached task.
    pub fn dispatch(&self, message: String) {
        info!(recipient = %self.recipient, alert = %message, "Operator alert");

        let Some(url) = self.webhook_url.clone() else {
            return;
        };
        let payload = AlertPayload {
            recipient: self.recipient.clone(),
            message,
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            match client.post(&url).json(&payload).send().await {
                Ok(resp) if resp.status().is_success() => {}
                Ok(resp) => {
                    error!(url = %url, status = %resp.status(), "Alert webhook rejected payload");
                }
                Err(e) => {
                    error!(url = %url, error = %e, "Alert webhook delivery failed");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_webhook_is_log_only() {
        let sink = AlertSink::from_config(&NotifyConfig {
            recipient: "ops@example.com".to_string(),
            webhook_url: "   ".to_string(),
        });
        assert!(sink.webhook_url.is_none());
        // No runtime needed on the log-only path
        sink.dispatch("test alert".to_string());
    }

    #[tokio::test]
    async fn test_webhook_dispatch_does_not_block() {
        // Nothing listens on this port; dispatch must still return instantly
        // and the failure is absorbed by the detached task
        let sink = AlertSink::from_config(&NotifyConfig {
            recipient: "ops@example.com".to_string(),
            webhook_url: "http://127.0.0.1:9/unreachable".to_string(),
        });
        sink.dispatch("test alert".to_string());
    }
}
