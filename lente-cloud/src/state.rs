//! Application state

use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;
use crate::db::{BoxError, OrgDirectory, PgDirectory};
use crate::monitoring::{Notifier, SecurityMonitor};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Admin role and branch ownership lookups
    pub directory: Arc<dyn OrgDirectory>,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    /// Business timezone for report windows
    pub timezone: Tz,
    pub monitor: SecurityMonitor,
}

impl AppState {
    /// Connect, migrate and assemble the state
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let notifier = Notifier::new(
            config.slack_webhook_url.clone(),
            config.pagerduty_routing_key.clone(),
        );
        if notifier.is_empty() {
            tracing::warn!("No security alert channels configured, alerts are logged only");
        }

        Ok(Self {
            directory: Arc::new(PgDirectory::new(pool.clone())),
            pool,
            jwt_secret: config.jwt_secret.clone(),
            timezone: config.business_timezone,
            monitor: SecurityMonitor::new(
                notifier,
                config.alert_min_severity,
                Duration::from_secs(config.alert_suppress_secs),
            ),
        })
    }

    /// Today's date in the business timezone
    pub fn today(&self) -> chrono::NaiveDate {
        chrono::Utc::now().with_timezone(&self.timezone).date_naive()
    }
}
