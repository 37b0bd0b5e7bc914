use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Persistence(String),
}

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Logs the storage failure and hides it behind a client-facing message.
    pub(crate) fn persistence(message: &str, cause: anyhow::Error) -> Self {
        tracing::error!(error = ?cause, "{}", message);
        CatalogError::Persistence(message.to_string())
    }

    /// Plain-text rendering used by the HTML routes.
    pub fn into_text_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
