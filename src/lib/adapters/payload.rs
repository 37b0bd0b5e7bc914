use axum::{
    Form,
    body::{Body, to_bytes},
    extract::{FromRequest, Request},
    http::header,
};
use serde::de::DeserializeOwned;

use crate::core::CatalogError;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body read as either a URL-encoded form or JSON, chosen by the
/// `Content-Type` header. A missing or blank body reads as `{}`, and any
/// rejection is a `CatalogError::Validation`.
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = CatalogError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with(FORM_CONTENT_TYPE));

        let (parts, body) = req.into_parts();
        let bytes = to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| CatalogError::Validation(format!("Invalid request body: {e}")))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_slice(b"{}")
                .map(Payload)
                .map_err(|e| CatalogError::Validation(format!("Invalid request body: {e}")));
        }

        if is_form {
            let req = Request::from_parts(parts, Body::from(bytes));
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| CatalogError::Validation(e.body_text()))?;
            return Ok(Payload(value));
        }

        serde_json::from_slice(&bytes)
            .map(Payload)
            .map_err(|e| CatalogError::Validation(format!("Invalid JSON body: {e}")))
    }
}
