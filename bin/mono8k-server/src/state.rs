//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::error::ServerError;
use crate::handlers::{AudioConverter, IntakeResolver, Pipeline, Storage};
use crate::templates::Templates;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Intake → conversion pipeline.
    pub pipeline: Arc<Pipeline>,
    /// Embedded HTML templates.
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Wire the pipeline from `config`, converting with `converter`.
    pub fn new(config: Config, converter: Arc<dyn AudioConverter>) -> Result<Self, ServerError> {
        let storage = Storage::new(&config.incoming_dir, &config.converted_dir);
        let client = reqwest::Client::builder()
            .user_agent(concat!("mono8k/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        let intake = IntakeResolver::new(
            storage.clone(),
            client,
            config.allowed_extensions.clone(),
            config.fetch_chunk_size,
        );

        Ok(Self {
            pipeline: Arc::new(Pipeline::new(intake, converter, storage)),
            templates: Arc::new(Templates::new()?),
            config: Arc::new(config),
        })
    }
}
