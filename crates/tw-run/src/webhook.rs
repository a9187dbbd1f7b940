// webhook.rs — HTTP webhook notification sink.
//
// Posts each event as JSON: the rendered subject/body at the top level for
// simple consumers (chat relays, mail gateways) plus the full structured
// event. One attempt per event, bounded by the client timeout.

use std::time::Duration;

use serde::Serialize;

use crate::error::NotifyError;
use crate::events::{GovernanceEvent, NotificationSink};

#[derive(Serialize)]
struct WebhookPayload<'a> {
    event_type: &'a str,
    subject: &'a str,
    body: &'a str,
    event: &'a GovernanceEvent,
}

impl<'a> WebhookPayload<'a> {
    fn from_event(event: &'a GovernanceEvent) -> Self {
        let notice = event.notice();
        Self {
            event_type: event.event_type(),
            subject: &notice.subject,
            body: &notice.body,
            event,
        }
    }
}

/// Delivers events to an HTTP endpoint.
pub struct WebhookSink {
    url: String,
    client: reqwest::blocking::Client,
}

impl WebhookSink {
    /// Create a sink posting to `url`, giving up on any request after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl NotificationSink for WebhookSink {
    fn send(&self, event: &GovernanceEvent) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload::from_event(event))
            .send()
            .map_err(|e| NotifyError::Transport(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(event = event.event_type(), "notification sent to webhook");
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
