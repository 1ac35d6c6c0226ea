use dotenvy::dotenv;
use studio_scheduler::{config, errors::Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Connect and make sure the schema exists
    let db = config::database::retry_transient("connect", config::database::create_connection)
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| warn!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db).await?;
    info!("Database schema ready.");

    // 4. Seed class groups from config.toml, if present
    match config::class_groups::load_default_config() {
        Ok(cfg) => {
            let created = config::class_groups::seed_class_groups(&db, &cfg).await?;
            info!(created, "Class group seeding finished.");
        }
        Err(e) => warn!("Skipping class group seeding: {e}"),
    }

    info!("Scheduler core initialized.");
    Ok(())
}
