//! Trustlet Service - HTTP API for review collection
//!
//! This is the main entry point for the Trustlet service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trustlet_service::{create_router, AppState, ServiceConfig};
use trustlet_store::{MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,trustlet=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trustlet Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        database_configured = %config.database_url.is_some(),
        auth_url = %config.auth_url,
        "Service configuration loaded"
    );

    // Initialize the store
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            tracing::info!(
                max_connections = %config.database_max_connections,
                "Connecting to PostgreSQL"
            );
            Arc::new(PgStore::connect(url, config.database_max_connections).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set - using in-memory store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    // Build app state
    let state = AppState::new(store, config.clone())?;

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
