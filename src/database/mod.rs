pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

use std::sync::Arc;

use tracing::info;

use crate::config::{AppConfig, StoreBackend};

pub use manager::DatabaseManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{DirectoryStore, IdentityStore, SharedStore, Store, StoreError};

/// Build the configured backing store, running migrations for postgres when enabled
pub async fn open_store(config: &AppConfig) -> Result<SharedStore, StoreError> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                DatabaseManager::migrate(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            info!("Using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
