//! Notification sinks for alert delivery
//!
//! Supports:
//! - Logging alerts (no outbound traffic)
//! - JSON webhook delivery with a bearer token

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::AlertEvent;

use crate::config::NotificationConfig;
use crate::error::{EngineError, EngineResult};

/// Delivers an alert to one recipient
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient: &str, event: &AlertEvent) -> EngineResult<()>;
}

/// Writes alerts to the log instead of sending them
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn send(&self, recipient: &str, event: &AlertEvent) -> EngineResult<()> {
        tracing::info!(
            recipient = %recipient,
            kind = %event.kind,
            severity = %event.severity,
            entity_id = ?event.entity_id,
            recommendations = event.recommendations.len(),
            "ALERT: {}",
            event.message
        );
        Ok(())
    }
}

/// Webhook push request
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    recipient: &'a str,
    alert: &'a AlertEvent,
}

/// Webhook error response
#[derive(Debug, Deserialize)]
struct WebhookErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Posts alerts as JSON to a webhook
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    token: Option<String>,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, token: Option<String>) -> Self {
        Self {
            url,
            token,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create from configuration; `None` when no webhook is configured
    pub fn from_config(config: &NotificationConfig) -> Option<Self> {
        let url = config.webhook_url.clone().filter(|u| !u.trim().is_empty())?;
        Some(Self::new(url, config.webhook_token.clone()))
    }
}

#[async_trait]
impl NotificationSink for WebhookNotifier {
    async fn send(&self, recipient: &str, event: &AlertEvent) -> EngineResult<()> {
        let payload = WebhookPayload {
            recipient,
            alert: event,
        };

        let mut request = self
            .http_client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(&payload);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await.map_err(|e| EngineError::Notification {
            recipient: recipient.to_string(),
            message: format!("Failed to send webhook: {}", e),
        })?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error: WebhookErrorResponse = response
                .json()
                .await
                .unwrap_or(WebhookErrorResponse { message: None });
            Err(EngineError::Notification {
                recipient: recipient.to_string(),
                message: format!(
                    "Webhook returned {}: {}",
                    status,
                    error.message.unwrap_or_else(|| "Unknown error".to_string())
                ),
            })
        }
    }
}
