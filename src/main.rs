//! Watchwheel catalog service
//!
//! Serves the shared movie/series catalog, per-user personal lists, and
//! the editor-elevation workflow over HTTP.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watchwheel::{bootstrap, routes, AppState, Config, SqliteStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "watchwheel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(port = config.port, database = %config.database_path, "Loaded configuration");

    // Open the store and guarantee the admin account
    let store = SqliteStore::open(&config.database_path)?;
    bootstrap::seed_admin(&store, &config)?;

    // Create app state and router
    let state = Arc::new(AppState::new(
        store,
        config.jwt_secret.clone(),
        config.token_ttl_hours,
    ));
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Catalog service listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
