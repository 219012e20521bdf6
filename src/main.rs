//! FastX Portal - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Seed the default key if the key store is empty
//! 5. Build HTTP router with routes and middleware
//! 6. Start server on configured port

use std::sync::Arc;

use fastx_portal::{
    config, db,
    routes::build_router,
    services::{key_service, lookup_service::LookupProxy},
    state::AppState,
    store::PgStore,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Refuses to start without DATABASE_URL
    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, &config.database_name).await?;
    tracing::info!("Connected to database: {}", config.database_name);

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let store = Arc::new(PgStore::new(pool));
    if key_service::seed_default_key(&*store).await? {
        tracing::info!("Seeded default access key");
    }

    let lookup = LookupProxy::new(reqwest::Client::new(), &config.lookup_base_url)?;
    let state = AppState::new(store.clone(), store, &config.admin_password, lookup);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("FastX portal listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
