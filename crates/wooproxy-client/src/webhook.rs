use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Body posted to the workflow-automation webhook.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowEvent {
    pub event: String,
    pub payload: Value,
    /// Unix seconds
    pub timestamp: u64,
}

/// Notifies an external workflow-automation endpoint about dashboard events.
/// Delivery is best effort: the response is ignored and failures are only logged.
#[derive(Debug, Clone)]
pub struct WorkflowWebhook {
    http: reqwest::Client,
    url: String,
}

impl WorkflowWebhook {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_http_client(url, reqwest::Client::new())
    }

    pub fn with_http_client(url: impl Into<String>, http: reqwest::Client) -> Self {
        let url = url.into();
        if !url.starts_with("https://") {
            tracing::warn!(url = %url, "workflow webhook URL does not use HTTPS");
        }
        Self { http, url }
    }

    /// Fire-and-forget POST of `{ event, payload, timestamp }`.
    ///
    /// Must be called from within a tokio runtime. The returned handle may be
    /// dropped; the delivery keeps running.
    pub fn trigger(&self, event: &str, payload: Value) -> tokio::task::JoinHandle<()> {
        let body = WorkflowEvent {
            event: event.to_string(),
            payload,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        let client = self.http.clone();
        let url = self.url.clone();

        tokio::spawn(async move {
            let result = client
                .post(&url)
                .timeout(WEBHOOK_TIMEOUT)
                .json(&body)
                .send()
                .await;
            match result {
                Ok(resp) => tracing::debug!(
                    url = %url,
                    event = %body.event,
                    status = %resp.status(),
                    "workflow webhook delivered"
                ),
                Err(e) => tracing::warn!(
                    url = %url,
                    event = %body.event,
                    error = %e,
                    "workflow webhook delivery failed"
                ),
            }
        })
    }
}
