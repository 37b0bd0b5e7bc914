use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Json,
    Sqlite,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(StorageBackend::Json),
            "sqlite" => Ok(StorageBackend::Sqlite),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("unknown STORE_BACKEND {:?} (expected json, sqlite or memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StorageBackend,
    /// Directory holding `movies.json` and `messages.json`.
    pub data_dir: PathBuf,
    /// SQLite file path or `sqlite:` URL.
    pub database_url: String,
    pub views_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            backend: StorageBackend::Json,
            data_dir: PathBuf::from("data"),
            database_url: "movies.db".to_string(),
            views_dir: PathBuf::from("views"),
            public_dir: PathBuf::from("public"),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment, after loading a
    /// `.env` file when one is present. Unset variables keep their defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(host) = lookup("HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.port = port.parse().with_context(|| format!("parse PORT {:?}", port))?;
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            config.backend = backend.parse()?;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            config.data_dir = dir.into();
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(dir) = lookup("VIEWS_DIR") {
            config.views_dir = dir.into();
        }
        if let Some(dir) = lookup("PUBLIC_DIR") {
            config.public_dir = dir.into();
        }
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
