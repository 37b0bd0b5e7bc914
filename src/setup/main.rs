use std::path::PathBuf;

use anyhow::Context;
use movie_library::storage::sqlite::initialize_database;

struct Args {
    reset: bool,
    schema: PathBuf,
    database: PathBuf,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args {
        reset: false,
        schema: PathBuf::from("schema/database.sql"),
        database: std::env::var("DATABASE_URL")
            .map(|url| PathBuf::from(url.trim_start_matches("sqlite://").trim_start_matches("sqlite:")))
            .unwrap_or_else(|_| PathBuf::from("movies.db")),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--reset" => args.reset = true,
            "--schema" => {
                args.schema = iter.next().context("--schema needs a path")?.into();
            }
            flag if flag.starts_with("--") => anyhow::bail!("unknown flag {}", flag),
            path => args.database = path.into(),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let args = parse_args()?;
    tracing::info!("initializing movie library database");

    let schema = tokio::fs::read_to_string(&args.schema)
        .await
        .with_context(|| format!("read schema {:?}", args.schema))?;
    let count = initialize_database(&args.database, &schema, args.reset)
        .await
        .context("initialize database")?;

    tracing::info!(count, "total movies in database");
    tracing::info!("database ready, start the server with `cargo run --bin movie-library`");
    Ok(())
}
