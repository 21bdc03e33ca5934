//! quake-gateway server entry point.
//!
//! Starts the event sync loop in the background, then serves the REST
//! endpoints until Ctrl-C.

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use quake_gateway::api;
use quake_gateway::app_state::AppState;
use quake_gateway::cache::EventCache;
use quake_gateway::config::GatewayConfig;
use quake_gateway::service::QueryService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(
        addr = %config.listen_addr,
        cache = %config.cache_path.display(),
        "starting quake-gateway"
    );

    let cache = EventCache::new(config.cache_path.clone());

    // Background refresh; does not block startup
    let scheduler = quake_gateway::sync::start(&config, cache.clone())?;

    let app_state = AppState {
        query_service: Arc::new(QueryService::new(cache)),
        default_start_date: config.query_default_start_date,
    };

    let app = api::build_router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = scheduler.shutdown().await {
        tracing::error!(error = %e, "sync scheduler terminated abnormally");
    }
    tracing::info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
