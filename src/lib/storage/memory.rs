use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::{Message, Movie};

use super::Storage;

/// Keeps both collections in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
    movies: RwLock<Vec<Movie>>,
    messages: RwLock<Vec<Message>>,
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn load_movies(&self) -> Result<Vec<Movie>> {
        Ok(self.movies.read().await.clone())
    }

    async fn save_movies(&self, movies: &[Movie]) -> Result<()> {
        *self.movies.write().await = movies.to_vec();
        Ok(())
    }

    async fn load_messages(&self) -> Result<Vec<Message>> {
        Ok(self.messages.read().await.clone())
    }

    async fn save_messages(&self, messages: &[Message]) -> Result<()> {
        *self.messages.write().await = messages.to_vec();
        Ok(())
    }
}
