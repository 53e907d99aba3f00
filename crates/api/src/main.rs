use anyhow::Result;
use tracing::info;

mod app;
mod config;
mod error;
mod middleware;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging and metrics
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics();

    info!("Starting Phone Auth API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::create_pool(&config.database.to_pool_config()).await?;

    // Run migrations
    info!("Running database migrations...");
    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await?;
    info!("Migrations completed");

    // Create the first staff account if configured
    services::admin_bootstrap::bootstrap_admin(&pool, &config.admin).await?;

    // Build application
    let app = app::create_app(config.clone(), pool);

    // Start server
    let addr = config.socket_addr();
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
