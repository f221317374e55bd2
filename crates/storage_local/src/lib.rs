use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{StorageBackend, StorageSettings};
use core_types::PersistenceGateway;
use thiserror::Error;
use tracing::info;

mod delayed;
mod file;
mod memory;
mod sqlite;

pub use delayed::Delayed;
pub use file::JsonFileGateway;
pub use memory::MemoryGateway;
pub use sqlite::{CURRENT_DB_SCHEMA_VERSION, SqliteGateway};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database schema version {found} is newer than supported version {supported}")]
    SchemaTooNew { found: u32, supported: u32 },
}

pub const DB_FILE_NAME: &str = "pinboard.db";

/// Build the configured backend, wrapped with the configured round-trip latency.
pub async fn open_gateway(
    settings: &StorageSettings,
    data_dir: &Path,
) -> Result<Arc<dyn PersistenceGateway>> {
    let latency = Duration::from_millis(settings.latency_ms);
    info!(backend = ?settings.backend, latency_ms = settings.latency_ms, "opening note storage");

    let gateway: Arc<dyn PersistenceGateway> = match settings.backend {
        StorageBackend::Sqlite => {
            std::fs::create_dir_all(data_dir)
                .with_context(|| format!("failed to create {}", data_dir.display()))?;
            let sqlite = SqliteGateway::connect(data_dir.join(DB_FILE_NAME)).await?;
            Arc::new(Delayed::new(sqlite, latency))
        }
        StorageBackend::JsonFile => {
            Arc::new(Delayed::new(JsonFileGateway::from_dir(data_dir), latency))
        }
        StorageBackend::Memory => Arc::new(Delayed::new(MemoryGateway::new(), latency)),
    };
    Ok(gateway)
}
