//! Alert delivery: Slack incoming webhook and PagerDuty Events API v2

use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use serde_json::{Value, json};

use super::{SecurityEvent, Severity};

const PAGERDUTY_ENQUEUE_URL: &str = "https://events.pagerduty.com/v2/enqueue";
const SOURCE: &str = "lente-cloud";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("{channel} request failed: {source}")]
    Http {
        channel: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{channel} responded with HTTP {status}")]
    Status { channel: &'static str, status: u16 },
}

/// Configured alert channels
#[derive(Clone)]
pub struct Notifier {
    client: reqwest::Client,
    slack_webhook_url: Option<String>,
    pagerduty_routing_key: Option<String>,
}

impl Notifier {
    pub fn new(slack_webhook_url: Option<String>, pagerduty_routing_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            slack_webhook_url,
            pagerduty_routing_key,
        }
    }

    /// No channel configured
    pub fn is_empty(&self) -> bool {
        self.slack_webhook_url.is_none() && self.pagerduty_routing_key.is_none()
    }

    /// Deliver to every configured channel concurrently, one result per channel
    pub async fn send(&self, event: &SecurityEvent) -> Vec<Result<(), NotifyError>> {
        let mut deliveries: Vec<BoxFuture<'_, Result<(), NotifyError>>> = Vec::new();
        if let Some(url) = &self.slack_webhook_url {
            deliveries.push(self.post("slack", url, slack_payload(event)).boxed());
        }
        if let Some(key) = &self.pagerduty_routing_key {
            deliveries.push(
                self.post("pagerduty", PAGERDUTY_ENQUEUE_URL, pagerduty_payload(key, event))
                    .boxed(),
            );
        }
        join_all(deliveries).await
    }

    async fn post(&self, channel: &'static str, url: &str, body: Value) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|source| NotifyError::Http { channel, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Status {
                channel,
                status: status.as_u16(),
            });
        }
        tracing::debug!(channel, "Security alert delivered");
        Ok(())
    }
}

fn timestamp(event: &SecurityEvent) -> String {
    chrono::DateTime::from_timestamp_millis(event.occurred_at)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn slack_payload(event: &SecurityEvent) -> Value {
    let mut fields = vec![
        json!({ "type": "mrkdwn", "text": format!("*Severity:*\n{}", event.severity) }),
        json!({ "type": "mrkdwn", "text": format!("*Kind:*\n{}", event.kind.as_str()) }),
    ];
    if let Some(org) = &event.org_id {
        fields.push(json!({ "type": "mrkdwn", "text": format!("*Organization:*\n{org}") }));
    }
    if let Some(subject) = &event.subject {
        fields.push(json!({ "type": "mrkdwn", "text": format!("*Subject:*\n{subject}") }));
    }
    if let Some(path) = &event.path {
        fields.push(json!({ "type": "mrkdwn", "text": format!("*Path:*\n`{path}`") }));
    }

    json!({
        "text": format!("[{}] {}", event.severity.as_str().to_uppercase(), event.message),
        "blocks": [
            {
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": format!(":rotating_light: *{}*", event.message)
                }
            },
            { "type": "section", "fields": fields },
            {
                "type": "context",
                "elements": [{
                    "type": "mrkdwn",
                    "text": format!("{SOURCE} · {}", timestamp(event))
                }]
            }
        ]
    })
}

/// PagerDuty only knows critical / error / warning / info
fn pagerduty_severity(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "critical",
        Severity::High => "error",
        Severity::Medium => "warning",
        Severity::Low => "info",
    }
}

fn pagerduty_payload(routing_key: &str, event: &SecurityEvent) -> Value {
    json!({
        "routing_key": routing_key,
        "event_action": "trigger",
        "dedup_key": event.fingerprint(),
        "payload": {
            "summary": event.message,
            "source": SOURCE,
            "severity": pagerduty_severity(event.severity),
            "timestamp": timestamp(event),
            "component": "auth",
            "class": event.kind.as_str(),
            "custom_details": {
                "org_id": event.org_id,
                "subject": event.subject,
                "path": event.path,
            }
        }
    })
}
