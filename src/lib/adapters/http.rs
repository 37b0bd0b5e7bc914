use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, get_service},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::core::{Catalog, CatalogError, ContactForm, Message, Movie, MoviePayload};
use crate::query::{MovieQuery, QueryResult};
use crate::views;

use super::payload::Payload;

pub const PROJECT_NAME: &str = "Movie Library";
pub const API_VERSION: &str = "3.0";

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
}

pub async fn list_movies(
    State(state): State<AppState>,
    Query(query): Query<MovieQuery>,
) -> Result<Json<QueryResult>, CatalogError> {
    Ok(Json(state.catalog.list(&query).await?))
}

pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Movie>, CatalogError> {
    Ok(Json(state.catalog.get(&id).await?))
}

pub async fn create_movie(
    State(state): State<AppState>,
    Payload(body): Payload<MoviePayload>,
) -> Result<(StatusCode, Json<Movie>), CatalogError> {
    let movie = state.catalog.create(&body).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(body): Payload<MoviePayload>,
) -> Result<Json<Movie>, CatalogError> {
    Ok(Json(state.catalog.update(&id, &body).await?))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, CatalogError> {
    let deleted = state.catalog.delete(&id).await?;
    Ok(Json(json!({
        "message": "Movie deleted successfully",
        "deletedMovie": deleted,
    })))
}

pub async fn seed(State(state): State<AppState>) -> Result<Json<Value>, CatalogError> {
    let movies = state.catalog.all().await?;
    Ok(Json(json!({
        "message": "Movies loaded from file",
        "count": movies.len(),
        "movies": movies,
    })))
}

pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<Message>>, CatalogError> {
    Ok(Json(state.catalog.messages().await?))
}

pub async fn info(State(state): State<AppState>) -> Result<Json<Value>, CatalogError> {
    let movies = state.catalog.all().await?;
    Ok(Json(json!({
        "project": PROJECT_NAME,
        "version": API_VERSION,
        "movieCount": movies.len(),
    })))
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub async fn search_page(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Response {
    let Some(term) = params.q.filter(|q| !q.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Enter search term").into_response();
    };
    match state.catalog.search(&term).await {
        Ok(results) => Html(views::search_page(&term, &results)).into_response(),
        Err(e) => e.into_text_response(),
    }
}

pub async fn movie_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.catalog.get(&id).await {
        Ok(movie) => Html(views::movie_page(&movie)).into_response(),
        Err(e) => e.into_text_response(),
    }
}

pub async fn submit_contact(
    State(state): State<AppState>,
    form: Result<Payload<ContactForm>, CatalogError>,
) -> Response {
    let form = match form {
        Ok(Payload(form)) => form,
        Err(e) => return e.into_text_response(),
    };
    match state.catalog.submit_message(form).await {
        Ok(message) => Html(views::thank_you_page(&message.name)).into_response(),
        Err(e) => e.into_text_response(),
    }
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/{id}", get(get_movie).put(update_movie).delete(delete_movie))
        .route("/seed", get(seed))
        .route("/messages", get(list_messages))
        .route("/info", get(info))
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let uri = request.uri().to_string();
        tracing::info_span!("http_request", method = ?request.method(), uri)
    });

    Router::new()
        .route("/", get_service(ServeFile::new(config.views_dir.join("index.html"))))
        .route("/about", get_service(ServeFile::new(config.views_dir.join("about.html"))))
        .route(
            "/contact",
            get_service(ServeFile::new(config.views_dir.join("contact.html"))).post(submit_contact),
        )
        .route("/search", get(search_page))
        .route("/item/{id}", get(movie_page))
        .nest("/api", api_routes())
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(trace_layer)
        .with_state(state)
}

pub struct HttpServer {
    router: Router,
    listener: net::TcpListener,
}

impl HttpServer {
    pub async fn new(state: AppState, config: &AppConfig) -> anyhow::Result<Self> {
        let router = router(state, config);
        let addr = config.bind_addr();
        let listener = net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to listen on {}", addr))?;
        Ok(Self { router, listener })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.listener.local_addr()?;
        tracing::info!(%addr, "movie library listening");
        tracing::info!("GET    /api/movies          all movies (genre, year, director, title, year_min, year_max, sortBy, order, fields)");
        tracing::info!("GET    /api/movies/{{id}}     movie by id");
        tracing::info!("POST   /api/movies          create movie");
        tracing::info!("PUT    /api/movies/{{id}}     update movie");
        tracing::info!("DELETE /api/movies/{{id}}     delete movie");
        tracing::info!("GET    /api/seed            all stored movies");
        axum::serve(self.listener, self.router)
            .await
            .context("received error from running server")?;
        Ok(())
    }
}
