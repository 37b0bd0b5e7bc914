use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use crate::core::{CatalogError, ContactForm, Message, Movie, MoviePayload};
use crate::query::{MovieQuery, QueryResult};
use crate::storage::Storage;

const MOVIE_NOT_FOUND: &str = "Movie not found";

/// CRUD over the stored collections. Every call reloads the collection from
/// storage; writers of the same collection are serialized so a
/// load-modify-save cycle never overwrites a concurrent one.
pub struct Catalog {
    storage: Arc<dyn Storage>,
    movie_writes: Mutex<()>,
    message_writes: Mutex<()>,
}

impl Catalog {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            movie_writes: Mutex::new(()),
            message_writes: Mutex::new(()),
        }
    }

    async fn load_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        self.storage
            .load_movies()
            .await
            .map_err(|e| CatalogError::persistence("Internal server error", e))
    }

    async fn save_movies(&self, movies: &[Movie], failure: &str) -> Result<(), CatalogError> {
        self.storage
            .save_movies(movies)
            .await
            .map_err(|e| CatalogError::persistence(failure, e))
    }

    pub async fn all(&self) -> Result<Vec<Movie>, CatalogError> {
        self.load_movies().await
    }

    pub async fn list(&self, query: &MovieQuery) -> Result<QueryResult, CatalogError> {
        Ok(query.apply(self.load_movies().await?))
    }

    pub async fn get(&self, id: &str) -> Result<Movie, CatalogError> {
        self.load_movies()
            .await?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| CatalogError::NotFound(MOVIE_NOT_FOUND.to_string()))
    }

    pub async fn create(&self, payload: &MoviePayload) -> Result<Movie, CatalogError> {
        let movie = Movie::create(payload, Utc::now())?;

        let _guard = self.movie_writes.lock().await;
        let mut movies = self.load_movies().await?;
        movies.push(movie.clone());
        self.save_movies(&movies, "Failed to save movie").await?;

        tracing::info!(id = %movie.id, title = %movie.title, "movie created");
        Ok(movie)
    }

    pub async fn update(&self, id: &str, payload: &MoviePayload) -> Result<Movie, CatalogError> {
        let _guard = self.movie_writes.lock().await;
        let mut movies = self.load_movies().await?;
        let movie = movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CatalogError::NotFound(MOVIE_NOT_FOUND.to_string()))?;
        movie.apply_update(payload, Utc::now())?;
        let updated = movie.clone();
        self.save_movies(&movies, "Failed to update movie").await?;

        tracing::info!(id = %updated.id, "movie updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<Movie, CatalogError> {
        let _guard = self.movie_writes.lock().await;
        let mut movies = self.load_movies().await?;
        let index = movies
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| CatalogError::NotFound(MOVIE_NOT_FOUND.to_string()))?;
        let removed = movies.remove(index);
        self.save_movies(&movies, "Failed to delete movie").await?;

        tracing::info!(id = %removed.id, "movie deleted");
        Ok(removed)
    }

    /// Movies whose title or description contains `term`, ignoring case.
    pub async fn search(&self, term: &str) -> Result<Vec<Movie>, CatalogError> {
        let term = term.to_lowercase();
        let mut movies = self.load_movies().await?;
        movies.retain(|m| {
            m.title.to_lowercase().contains(&term) || m.description.to_lowercase().contains(&term)
        });
        Ok(movies)
    }

    pub async fn messages(&self) -> Result<Vec<Message>, CatalogError> {
        self.storage
            .load_messages()
            .await
            .map_err(|e| CatalogError::persistence("Internal server error", e))
    }

    pub async fn submit_message(&self, form: ContactForm) -> Result<Message, CatalogError> {
        let mut message = form.into_message(Utc::now())?;

        let _guard = self.message_writes.lock().await;
        let mut messages = self.messages().await?;
        message.id = messages.len() as u64 + 1;
        messages.push(message.clone());
        self.storage
            .save_messages(&messages)
            .await
            .map_err(|e| CatalogError::persistence("Failed to save message", e))?;

        tracing::info!(id = message.id, "contact message stored");
        Ok(message)
    }
}
