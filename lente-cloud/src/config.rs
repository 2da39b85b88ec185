//! Service configuration

use chrono_tz::Tz;

use crate::db::BoxError;
use crate::monitoring::Severity;

const DEFAULT_TIMEZONE: &str = "Europe/Madrid";

/// Service configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// HS256 secret for user JWTs
    pub jwt_secret: String,
    /// Timezone in which report dates are calendar days
    pub business_timezone: Tz,
    pub db_max_connections: u32,
    /// Slack incoming webhook for security alerts
    pub slack_webhook_url: Option<String>,
    /// PagerDuty Events v2 routing key for security alerts
    pub pagerduty_routing_key: Option<String>,
    /// Lowest severity that is pushed to the alert channels
    pub alert_min_severity: Severity,
    /// Window during which repeats of the same alert are suppressed
    pub alert_suppress_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, BoxError> {
        let environment = var("ENVIRONMENT").unwrap_or_else(|| "development".into());

        let timezone = var("BUSINESS_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.into());
        let business_timezone: Tz = timezone
            .parse()
            .map_err(|_| format!("BUSINESS_TIMEZONE is not a valid IANA timezone: {timezone}"))?;

        let alert_min_severity = match var("ALERT_MIN_SEVERITY") {
            Some(s) => s.parse()?,
            None => Severity::High,
        };

        Ok(Self {
            database_url: var("DATABASE_URL").ok_or("DATABASE_URL must be set")?,
            http_port: var("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret(&var, "JWT_SECRET", &environment)?,
            environment,
            business_timezone,
            db_max_connections: var("DB_MAX_CONNECTIONS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(10),
            slack_webhook_url: var("SLACK_WEBHOOK_URL").filter(|s| !s.is_empty()),
            pagerduty_routing_key: var("PAGERDUTY_ROUTING_KEY").filter(|s| !s.is_empty()),
            alert_min_severity,
            alert_suppress_secs: var("ALERT_SUPPRESS_SECS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(300),
        })
    }

    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(
        var: &impl Fn(&str) -> Option<String>,
        name: &str,
        environment: &str,
    ) -> Result<String, BoxError> {
        let val = match var(name) {
            Some(v) => v,
            None => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }
}
