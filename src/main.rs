//! NGS Dashboard Server
//!
//! Run with: cargo run --bin ngs-dashboard
//!
//! # Configuration
//!
//! Read from `config.toml` (see `ngs-dashboard-cli config`) with
//! environment overrides:
//! - `NGS_API_BASE_URL`: Sample API base URL (default: http://localhost:8000)
//! - `NGS_API_KEY`: Sent as `X-API-Key` (optional)
//! - `NGS_API_TIMEOUT_SECS`: Request timeout (optional)
//! - `NGS_DASHBOARD_HOST` / `NGS_DASHBOARD_PORT`: Bind address (default: 0.0.0.0:8084)
//! - `NGS_SAMPLES_REFETCH_SECS`: Sample list polling interval (default: 10)
//! - `NGS_LOG_LEVEL` / `NGS_LOG_FORMAT`: Logging (default: info, pretty)
//! - `RUST_LOG`: Overrides the log filter

use ngs_dashboard::{serve, ApiClient, AppState, Config, LoggingConfig, SampleQueries};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting NGS dashboard v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Sample API: {}", config.backend.base_url);
    if config.backend.api_key().is_none() {
        tracing::warn!("No API key configured; requests are sent without X-API-Key");
    }

    let client = ApiClient::new(config.backend.clone())?;
    let queries = Arc::new(SampleQueries::new(Arc::new(client), config.query.clone()));

    match queries.backend_health().await {
        Ok(health) => tracing::info!(status = %health.status, "Sample API reachable"),
        Err(e) => tracing::warn!("Sample API not available: {} (pages will show errors)", e),
    }

    let server = config.server.clone();
    serve(AppState::new(Arc::clone(&queries), config), &server).await?;

    queries.shutdown().await;
    tracing::info!("NGS dashboard stopped");

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("ngs_dashboard={},tower_http=debug", logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
