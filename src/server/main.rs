use std::sync::Arc;

use anyhow::Context;
use movie_library::adapters::{AppState, HttpServer};
use movie_library::config::AppConfig;
use movie_library::core::Catalog;
use movie_library::storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = AppConfig::from_env().context("load configuration")?;
    tracing::info!(backend = ?config.backend, "opening record store");
    let storage = storage::open(&config).await.context("open record store")?;

    let state = AppState {
        catalog: Arc::new(Catalog::new(storage)),
    };
    let server = HttpServer::new(state, &config).await?;
    server.run().await
}
