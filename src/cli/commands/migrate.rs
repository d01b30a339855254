use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::store_from_env()?;
    if config.store.backend != StoreBackend::Postgres {
        anyhow::bail!("migrate needs STORE_BACKEND=postgres");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    output_success(&output_format, "Migrations applied", None)
}
