use campus_attendance::{
    api::{self, AppState},
    config::{AppConfig, database},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file so RUST_LOG and friends can come from it
    dotenv().ok(); // Non-fatal, env vars can be set externally

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 3. Load the main application configuration
    let config = AppConfig::load()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&config.database_url)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create database tables: {}", e))?;

    // 5. Prepare upload directories
    let state = AppState::new(db, &config);
    state.face_uploads.ensure_root().await?;
    state.od_uploads.ensure_root().await?;

    // 6. Serve HTTP until shutdown
    api::serve(&config, state)
        .await
        .inspect_err(|e| error!("Server error: {}", e))
}
