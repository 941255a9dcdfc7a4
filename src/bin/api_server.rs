// API Server Binary Entry Point
//
// Purpose: Load the species catalog and start the Axum API server
// Usage: cargo run --features api --bin api_server

use anyhow::Context;
use catch_estimator_rust::logging::{init_tracing, DEFAULT_FILTER};
use catch_estimator_rust::{create_router, AppState, ServerConfig};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_FILTER);

    tracing::info!("Starting API server...");

    let config = ServerConfig::from_env().context("Invalid server configuration")?;

    tracing::info!("Configuration:");
    tracing::info!(
        "  SUPABASE_URL: {}",
        config.catalog.supabase_url.as_deref().unwrap_or("(unset)")
    );
    tracing::info!("  SPECIES_TABLE: {}", config.catalog.species_table);
    tracing::info!(
        "  STATIC_CATALOG_PATH: {}",
        config.catalog.static_catalog_path.display()
    );
    tracing::info!("  CATALOG_TIMEOUT: {:?}", config.catalog.timeout);
    tracing::info!("  PORT: {}", config.port);

    let loaded = config.catalog.build_loader().load().await;
    for skipped in &loaded.skipped {
        tracing::warn!("Skipped tier: {}", skipped);
    }

    let state = AppState::new(loaded, config.cache_ttl);
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
