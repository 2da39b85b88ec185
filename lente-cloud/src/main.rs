//! lente-cloud: analytics service for the optical-retail back office
//!
//! Long-running service that:
//! - Serves the admin analytics dashboard (KPIs, trends, top products)
//! - Checks appointment slot availability for branch staff
//! - Reports security events to the log and the alert channels

mod analytics;
mod api;
mod auth;
mod config;
mod db;
mod error;
mod monitoring;
mod state;

use config::Config;
use db::BoxError;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lente_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!(
        "Starting lente-cloud (env: {}, timezone: {})",
        config.environment,
        config.business_timezone
    );

    let state = AppState::new(&config).await?;

    // Periodic purge of expired alert suppression entries
    let monitor = state.monitor.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(
            monitor
                .suppress_window()
                .max(std::time::Duration::from_secs(1)),
        );
        loop {
            interval.tick().await;
            monitor.cleanup().await;
        }
    });

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("lente-cloud HTTP listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("lente-cloud stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
