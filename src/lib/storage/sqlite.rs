use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::FromRow;

use crate::core::{Message, Movie};

use super::Storage;

/// Schema applied on every connect and by the `init-database` utility.
pub const SCHEMA: &str = include_str!("../../../schema/database.sql");

pub struct SqliteStorage {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct MovieRow {
    #[sqlx(rename = "_id")]
    id: String,
    title: String,
    year: Option<i64>,
    director: String,
    genre: String,
    rating: Option<f64>,
    age_rating: Option<String>,
    description: String,
    created_at: String,
    updated_at: String,
}

#[derive(FromRow)]
struct MessageRow {
    id: i64,
    name: String,
    email: String,
    message: String,
    timestamp: String,
}

fn timestamp_text(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(text)
        .with_context(|| format!("bad timestamp {:?}", text))?
        .with_timezone(&Utc))
}

impl TryFrom<MovieRow> for Movie {
    type Error = anyhow::Error;

    fn try_from(row: MovieRow) -> Result<Self> {
        Ok(Movie {
            genre: serde_json::from_str(&row.genre)
                .with_context(|| format!("bad genre column for movie {}", row.id))?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            id: row.id,
            title: row.title,
            year: row.year,
            director: row.director,
            rating: row.rating,
            age_rating: row.age_rating,
            description: row.description,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = anyhow::Error;

    fn try_from(row: MessageRow) -> Result<Self> {
        Ok(Message {
            id: u64::try_from(row.id)?,
            name: row.name,
            email: row.email,
            message: row.message,
            timestamp: parse_timestamp(&row.timestamp)?,
        })
    }
}

/// Accepts either a `sqlite:` URL or a bare file path.
fn connect_options(database_url: &str) -> Result<SqliteConnectOptions> {
    let options = if database_url.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("parse sqlite url {}", database_url))?
    } else {
        SqliteConnectOptions::new().filename(database_url)
    };
    Ok(options.create_if_missing(true))
}

async fn apply_schema(pool: &SqlitePool, schema: &str) -> Result<()> {
    sqlx::raw_sql(schema)
        .execute(pool)
        .await
        .context("apply schema")?;
    Ok(())
}

impl SqliteStorage {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect_with(connect_options(database_url)?)
            .await
            .with_context(|| format!("connect to sqlite via {}", database_url))?;
        apply_schema(&pool, SCHEMA).await?;
        tracing::info!(database_url, "sqlite store ready");
        Ok(Self { pool })
    }

    pub async fn movie_count(&self) -> Result<i64> {
        count_movies(&self.pool).await
    }
}

async fn count_movies(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movies")
        .fetch_one(pool)
        .await
        .context("count movies")?;
    Ok(count)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn load_movies(&self) -> Result<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(
            "SELECT _id, title, year, director, genre, rating, age_rating, description, created_at, updated_at
             FROM movies ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .context("select movies")?;
        rows.into_iter().map(Movie::try_from).collect()
    }

    async fn save_movies(&self, movies: &[Movie]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM movies").execute(&mut *tx).await?;
        for movie in movies {
            sqlx::query(
                "INSERT INTO movies (_id, title, year, director, genre, rating, age_rating, description, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&movie.id)
            .bind(&movie.title)
            .bind(movie.year)
            .bind(&movie.director)
            .bind(serde_json::to_string(&movie.genre)?)
            .bind(movie.rating)
            .bind(&movie.age_rating)
            .bind(&movie.description)
            .bind(timestamp_text(&movie.created_at))
            .bind(timestamp_text(&movie.updated_at))
            .execute(&mut *tx)
            .await
            .with_context(|| format!("insert movie {}", movie.id))?;
        }
        tx.commit().await.context("commit movies")?;
        Ok(())
    }

    async fn load_messages(&self) -> Result<Vec<Message>> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, name, email, message, timestamp FROM messages ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .context("select messages")?;
        rows.into_iter().map(Message::try_from).collect()
    }

    async fn save_messages(&self, messages: &[Message]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM messages").execute(&mut *tx).await?;
        for message in messages {
            sqlx::query("INSERT INTO messages (id, name, email, message, timestamp) VALUES (?, ?, ?, ?, ?)")
                .bind(i64::try_from(message.id)?)
                .bind(&message.name)
                .bind(&message.email)
                .bind(&message.message)
                .bind(timestamp_text(&message.timestamp))
                .execute(&mut *tx)
                .await
                .context("insert message")?;
        }
        tx.commit().await.context("commit messages")?;
        Ok(())
    }
}

/// Creates (or with `reset`, recreates) the database file at `path`, applies
/// `schema` and returns the number of stored movies.
pub async fn initialize_database(path: &Path, schema: &str, reset: bool) -> Result<i64> {
    if reset && tokio::fs::try_exists(path).await? {
        tracing::info!(path = ?path, "removing old database");
        tokio::fs::remove_file(path)
            .await
            .with_context(|| format!("remove {:?}", path))?;
    }

    let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
    let pool = SqlitePool::connect_with(options)
        .await
        .with_context(|| format!("open sqlite file {:?}", path))?;
    tracing::info!(path = ?path, "connected to sqlite database");

    apply_schema(&pool, schema).await?;
    tracing::info!("movies table created/verified");

    let count = count_movies(&pool).await?;
    pool.close().await;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ContactForm, MoviePayload};
    use serde_json::json;
    use tempfile::TempDir;

    fn movie(body: serde_json::Value) -> Movie {
        let payload: MoviePayload = serde_json::from_value(body).unwrap();
        Movie::create(&payload, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn movies_survive_a_round_trip_in_order() -> Result<()> {
        let td = TempDir::new()?;
        let url = td.path().join("movies.db");
        let storage = SqliteStorage::connect(url.to_str().unwrap()).await?;

        let movies = vec![
            movie(json!({ "title": "Up", "year": 2009, "genre": ["Animation", "Family"], "rating": 8.3 })),
            movie(json!({ "title": "Alien", "year": 1979, "age_rating": "R" })),
        ];
        storage.save_movies(&movies).await?;
        assert_eq!(storage.load_movies().await?, movies);

        storage.save_movies(&movies[1..]).await?;
        assert_eq!(storage.movie_count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn messages_survive_a_round_trip() -> Result<()> {
        let td = TempDir::new()?;
        let storage = SqliteStorage::connect(td.path().join("m.db").to_str().unwrap()).await?;
        assert!(storage.load_messages().await?.is_empty());

        let form = ContactForm {
            name: Some("Ann".into()),
            email: Some("ann@example.com".into()),
            message: Some("hi".into()),
        };
        let message = Message {
            id: 1,
            ..form.into_message(Utc::now())?
        };
        storage.save_messages(std::slice::from_ref(&message)).await?;
        assert_eq!(storage.load_messages().await?, vec![message]);
        Ok(())
    }

    #[tokio::test]
    async fn initialize_reports_row_count_and_resets() -> Result<()> {
        let td = TempDir::new()?;
        let path = td.path().join("movies.db");
        assert_eq!(initialize_database(&path, SCHEMA, false).await?, 0);

        let storage = SqliteStorage::connect(path.to_str().unwrap()).await?;
        storage.save_movies(&[movie(json!({ "title": "Heat", "year": 1995 }))]).await?;
        storage.pool.close().await;

        assert_eq!(initialize_database(&path, SCHEMA, false).await?, 1);
        assert_eq!(initialize_database(&path, SCHEMA, true).await?, 0);
        Ok(())
    }
}
