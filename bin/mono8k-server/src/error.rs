//! Unified server error type.
//!
//! Conversion failures never reach this type: the pipeline turns them into a
//! rendered result page. `ServerError` only covers faults around that path,
//! such as a template that fails to render.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        // Log the full detail; the client only gets a generic message.
        match &self {
            ServerError::Template(e) => error!(error = %e, "failed to render page"),
        }
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}
