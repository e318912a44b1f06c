use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use petclinic_api::config::Config;
use petclinic_api::db::Database;
use petclinic_api::db_storage::PgStore;
use petclinic_api::memory_storage::MemoryStore;
use petclinic_api::{app_state, routes};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The record store (Postgres when configured, in-memory otherwise).
/// - HTTP routes and middleware.
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petclinic_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let state = match config.database_url {
        Some(ref url) => {
            let db = Database::new(url, config.db_max_connections).await?;
            tracing::info!("Database connection pool established");
            app_state(Arc::new(PgStore::new(db.pool)))
        }
        None => {
            tracing::info!("Using in-memory store with demo data");
            app_state(Arc::new(MemoryStore::with_demo_data()))
        }
    };

    let app = routes::build_router(Arc::new(state), config.max_body_bytes);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
