use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::core::{Message, Movie};

use super::Storage;

pub const MOVIES_FILE: &str = "movies.json";
pub const MESSAGES_FILE: &str = "messages.json";

/// Two pretty-printed JSON arrays under one data directory.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn movies_path(&self) -> PathBuf {
        self.dir.join(MOVIES_FILE)
    }

    pub fn messages_path(&self) -> PathBuf {
        self.dir.join(MESSAGES_FILE)
    }

    /// Creates the data directory and an empty movies file if they are missing.
    pub async fn init(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create data dir {:?}", self.dir))?;
        if !tokio::fs::try_exists(self.movies_path()).await? {
            write_array::<Movie>(&self.movies_path(), &[]).await?;
            tracing::info!(path = ?self.movies_path(), "created empty movies file");
        }
        Ok(())
    }
}

/// A missing or blank file is an empty collection. Anything else that does
/// not parse is an error, so the caller never saves over records it could
/// not read.
async fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let data = match tokio::fs::read_to_string(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("read {:?}", path)),
    };
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&data).with_context(|| format!("parse {:?}", path))
}

async fn write_array<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("write {:?}", path))
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn load_movies(&self) -> Result<Vec<Movie>> {
        read_array(&self.movies_path()).await
    }

    async fn save_movies(&self, movies: &[Movie]) -> Result<()> {
        write_array(&self.movies_path(), movies).await
    }

    async fn load_messages(&self) -> Result<Vec<Message>> {
        read_array(&self.messages_path()).await
    }

    async fn save_messages(&self, messages: &[Message]) -> Result<()> {
        write_array(&self.messages_path(), messages).await
    }
}
