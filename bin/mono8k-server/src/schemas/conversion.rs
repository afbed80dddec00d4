use std::path::PathBuf;

use bytes::Bytes;
use serde::Serialize;

/// Multipart field carrying the uploaded audio file.
pub const AUDIO_FILE_FIELD: &str = "audio_file";
/// Multipart field carrying a remote audio URL.
pub const AUDIO_URL_FIELD: &str = "audio_url";

/// Where the source audio of a request comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionRequest {
    /// Audio uploaded in the request body.
    UploadedFile { filename: String, bytes: Bytes },
    /// Audio to be fetched from a caller-supplied URL.
    RemoteUrl { url: String },
}

impl ConversionRequest {
    /// Resolve the request shape from the raw form fields.
    ///
    /// The file field wins whenever it is present, even with an empty
    /// filename. Returns `None` when neither field was submitted.
    pub fn from_fields(file: Option<(String, Bytes)>, url: Option<String>) -> Option<Self> {
        match (file, url) {
            (Some((filename, bytes)), _) => Some(Self::UploadedFile { filename, bytes }),
            (None, Some(url)) => Some(Self::RemoteUrl { url }),
            (None, None) => None,
        }
    }
}

/// Outcome of one conversion request, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionResult {
    pub success: bool,
    pub message: String,
    /// Set only when `success` is true.
    pub output_path: Option<PathBuf>,
}

impl ConversionResult {
    pub fn succeeded(message: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            success: true,
            message: message.into(),
            output_path: Some(output_path),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output_path: None,
        }
    }

    /// File name of the converted output, used to build the download link.
    pub fn output_file_name(&self) -> Option<String> {
        self.output_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}
