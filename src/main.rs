use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use sitewatch::api::create_api_router;
use sitewatch::config::Config;
use sitewatch::storage::{SqliteVisitStore, VisitStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    info!("Using SQLite visit store: {}", config.database.url);
    let store: Arc<dyn VisitStore> = Arc::new(
        SqliteVisitStore::new(&config.database.url, config.database.max_connections).await?,
    );

    info!("Initializing database...");
    store.init().await?;
    info!("Database initialized successfully");

    // Start API server
    let router = create_api_router(Arc::clone(&store), &config);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Dashboard API listening on http://{}", addr);
    info!("   - Reports available at http://{}/api/dashboard", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
