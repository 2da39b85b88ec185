//! Security event monitoring
//!
//! Every event is logged. Events at or above the alert threshold are also
//! pushed to the configured channels (Slack, PagerDuty), with repeats of
//! the same fingerprint suppressed for a time window.

pub mod notify;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub use notify::{Notifier, NotifyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown severity: {0} (expected low, medium, high or critical)")]
pub struct ParseSeverityError(String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Bearer token missing, malformed, expired or badly signed
    InvalidToken,
    /// Authenticated user without admin role hit an admin-only route
    AdminAccessDenied,
    /// Authenticated user asked for a branch of another organization
    CrossTenantAccess,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidToken => "invalid_token",
            Self::AdminAccessDenied => "admin_access_denied",
            Self::CrossTenantAccess => "cross_tenant_access",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub kind: EventKind,
    pub severity: Severity,
    pub message: String,
    pub org_id: Option<String>,
    /// User id or client address the event is about
    pub subject: Option<String>,
    pub path: Option<String>,
    /// Unix millis
    pub occurred_at: i64,
}

impl SecurityEvent {
    pub fn new(kind: EventKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            org_id: None,
            subject: None,
            path: None,
            occurred_at: shared::util::now_millis(),
        }
    }

    pub fn org(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Key under which repeats are suppressed: kind + org + subject
    pub fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}",
            self.kind.as_str(),
            self.org_id.as_deref().unwrap_or("-"),
            self.subject.as_deref().unwrap_or("-"),
        )
    }
}

/// What [`SecurityMonitor::record`] did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Below the alert threshold
    Logged,
    /// Same fingerprint alerted recently
    Suppressed,
    /// Handed to the alert channels
    Alerted,
}

#[derive(Clone)]
pub struct SecurityMonitor {
    notifier: Notifier,
    min_severity: Severity,
    suppress_window: Duration,
    /// fingerprint -> last alert
    recent: Arc<Mutex<HashMap<String, Instant>>>,
}

impl SecurityMonitor {
    pub fn new(notifier: Notifier, min_severity: Severity, suppress_window: Duration) -> Self {
        Self {
            notifier,
            min_severity,
            suppress_window,
            recent: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn record(&self, event: SecurityEvent) -> Outcome {
        log_event(&event);

        if event.severity < self.min_severity {
            return Outcome::Logged;
        }

        if !self.mark_alerted(&event.fingerprint()).await {
            tracing::debug!(
                kind = event.kind.as_str(),
                org_id = event.org_id.as_deref(),
                "Security alert suppressed"
            );
            return Outcome::Suppressed;
        }

        if self.notifier.is_empty() {
            tracing::debug!("No alert channels configured");
            return Outcome::Alerted;
        }

        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            for result in notifier.send(&event).await {
                if let Err(e) = result {
                    tracing::error!(
                        error = %e,
                        kind = event.kind.as_str(),
                        "Security alert delivery failed"
                    );
                }
            }
        });
        Outcome::Alerted
    }

    /// Returns `false` if the fingerprint is still inside its suppression window.
    async fn mark_alerted(&self, fingerprint: &str) -> bool {
        let mut recent = self.recent.lock().await;
        let now = Instant::now();
        match recent.get(fingerprint) {
            Some(last) if now.duration_since(*last) < self.suppress_window => false,
            _ => {
                recent.insert(fingerprint.to_owned(), now);
                true
            }
        }
    }

    /// Drop suppression entries whose window has passed
    pub async fn cleanup(&self) {
        let mut recent = self.recent.lock().await;
        let now = Instant::now();
        recent.retain(|_, last| now.duration_since(*last) < self.suppress_window);
    }

    pub fn suppress_window(&self) -> Duration {
        self.suppress_window
    }
}

fn log_event(event: &SecurityEvent) {
    let kind = event.kind.as_str();
    let org_id = event.org_id.as_deref();
    let subject = event.subject.as_deref();
    let path = event.path.as_deref();
    match event.severity {
        Severity::Low => {
            tracing::info!(kind, org_id, subject, path, severity = "low", "{}", event.message)
        }
        Severity::Medium => {
            tracing::warn!(kind, org_id, subject, path, severity = "medium", "{}", event.message)
        }
        Severity::High | Severity::Critical => tracing::error!(
            kind,
            org_id,
            subject,
            path,
            severity = event.severity.as_str(),
            "{}",
            event.message
        ),
    }
}
