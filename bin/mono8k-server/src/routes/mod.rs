//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - landing page and upload form handler
//! - static serving of the converted area under `/converted`
//! - health / heartbeat route
//! - middleware layers (CORS, per-request trace-ID span, upload body limit)

mod health;
mod pages;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{middleware, Router};
use tower_http::services::ServeDir;

use crate::middleware::{cors, trace};
use crate::state::AppState;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let converted = ServeDir::new(state.pipeline.storage().converted_dir());

    Router::new()
        .merge(pages::router())
        .merge(health::router())
        .nest_service("/converted", converted)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes()))
        // Outermost layers execute first on the way in.
        .layer(cors::cors_layer(&state))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}
