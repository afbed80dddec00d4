//! Landing page and form submission.

use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tracing::{debug, info};

use crate::error::ServerError;
use crate::schemas::conversion::{AUDIO_FILE_FIELD, AUDIO_URL_FIELD};
use crate::schemas::{ConversionRequest, ConversionResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
}

/// `GET /`: upload form and URL form.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ServerError> {
    let html = state
        .templates
        .render_index(&state.config.allowed_extensions)?;
    Ok(Html(html))
}

/// `POST /upload`: convert an uploaded file or a remote URL and render the
/// outcome. Conversion failures still answer 200 with a failure page.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Html<String>, ServerError> {
    let result = match multipart {
        Ok(multipart) => match read_form(multipart).await {
            Ok(request) => state.pipeline.run(request).await,
            Err(e) => ConversionResult::failed(format!("failed to read the form data: {e}")),
        },
        Err(rejection) => {
            // Not a multipart body: no recognizable request shape.
            debug!(error = %rejection, "upload without multipart body");
            state.pipeline.run(None).await
        }
    };

    info!(
        success = result.success,
        output = ?result.output_path,
        "upload handled"
    );
    Ok(Html(state.templates.render_result(&result)?))
}

/// Collect the first `audio_file` and `audio_url` fields; anything else is
/// ignored.
async fn read_form(mut multipart: Multipart) -> Result<Option<ConversionRequest>, MultipartError> {
    let mut file = None;
    let mut url = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(AUDIO_FILE_FIELD) if file.is_none() => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let bytes = field.bytes().await?;
                debug!(filename = %filename, size_bytes = bytes.len(), "received file field");
                file = Some((filename, bytes));
            }
            Some(AUDIO_URL_FIELD) if url.is_none() => {
                url = Some(field.text().await?);
            }
            _ => {}
        }
    }

    Ok(ConversionRequest::from_fields(file, url))
}
