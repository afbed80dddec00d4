//! Per-request orchestration: intake → conversion → source cleanup.

use std::sync::Arc;

use tracing::{info, warn};

use crate::handlers::ffmpeg::AudioConverter;
use crate::handlers::intake::IntakeResolver;
use crate::handlers::storage::Storage;
use crate::schemas::{ConversionRequest, ConversionResult};

pub struct Pipeline {
    intake: IntakeResolver,
    converter: Arc<dyn AudioConverter>,
    storage: Storage,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("intake", &self.intake)
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    pub fn new(
        intake: IntakeResolver,
        converter: Arc<dyn AudioConverter>,
        storage: Storage,
    ) -> Self {
        Self {
            intake,
            converter,
            storage,
        }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Run one request to completion. Every failure path ends up in the
    /// returned [`ConversionResult`].
    pub async fn run(&self, request: Option<ConversionRequest>) -> ConversionResult {
        let source = match self.intake.resolve(request).await {
            Ok(source) => source,
            Err(e) => {
                warn!(error = %e, "intake failed");
                return ConversionResult::failed(e.to_string());
            }
        };

        let destination = self.storage.converted_path(&source.filename);
        if let Err(e) = self.converter.convert(&source.path, &destination).await {
            // Source stays on disk for inspection.
            return ConversionResult::failed(e.to_string());
        }

        let mut message = format!("conversion succeeded: {}", destination.display());
        match tokio::fs::remove_file(&source.path).await {
            Ok(()) => info!(source = %source.path.display(), "removed incoming file"),
            Err(e) => {
                warn!(source = %source.path.display(), error = %e, "failed to remove incoming file");
                message.push_str(&format!(" (failed to delete incoming file: {e})"));
            }
        }

        ConversionResult::succeeded(message, destination)
    }
}
