pub mod json_file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use anyhow::Context;

use crate::config::{AppConfig, StorageBackend};
use crate::core::{Message, Movie};

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

/// Whole-collection persistence. Loading data that was never saved yields an
/// empty collection; saving replaces everything previously stored.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_movies(&self) -> anyhow::Result<Vec<Movie>>;
    async fn save_movies(&self, movies: &[Movie]) -> anyhow::Result<()>;
    async fn load_messages(&self) -> anyhow::Result<Vec<Message>>;
    async fn save_messages(&self, messages: &[Message]) -> anyhow::Result<()>;
}

/// Opens the backend named by the configuration.
pub async fn open(config: &AppConfig) -> anyhow::Result<Arc<dyn Storage>> {
    match config.backend {
        StorageBackend::Json => {
            let storage = JsonFileStorage::new(&config.data_dir);
            storage.init().await.context("initialize json data directory")?;
            Ok(Arc::new(storage))
        }
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => {
            let storage = SqliteStorage::connect(&config.database_url).await?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => anyhow::bail!("sqlite backend requires the `sqlite` feature"),
        StorageBackend::Memory => Ok(Arc::new(MemoryStorage::default())),
    }
}
