//! Intake: materialise the source audio of a request in the incoming area.

use std::path::PathBuf;

use futures::StreamExt;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use crate::handlers::storage::{sanitize_filename, Storage};
use crate::schemas::ConversionRequest;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("no valid action was received")]
    NoValidAction,

    #[error("no file selected")]
    NoFileSelected,

    #[error("unsupported file format")]
    UnsupportedFormat,

    #[error("no URL provided")]
    NoUrl,

    #[error("could not derive a file name from the URL")]
    UnnamedUrl,

    /// The remote server answered with something other than 200.
    #[error("failed to download the file from the URL (HTTP {status})")]
    DownloadStatus { status: StatusCode },

    /// Network failure, or any other fault while handling the URL branch.
    #[error("error processing the URL: {0}")]
    Url(String),

    #[error("failed to save the uploaded file: {0}")]
    Save(#[source] std::io::Error),
}

impl From<reqwest::Error> for IntakeError {
    fn from(e: reqwest::Error) -> Self {
        IntakeError::Url(e.to_string())
    }
}

/// A source file written to the incoming area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Name inside the incoming area; the converted output derives from it.
    pub filename: String,
    pub path: PathBuf,
}

/// Case-insensitive check of the text after the last `.` against `allowed`.
pub fn is_allowed_file(filename: &str, allowed: &[String]) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => {
            let ext = ext.to_ascii_lowercase();
            allowed.iter().any(|a| *a == ext)
        }
        None => false,
    }
}

/// Text after the last `/` of a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

#[derive(Debug, Clone)]
pub struct IntakeResolver {
    storage: Storage,
    client: Client,
    allowed_extensions: Vec<String>,
    chunk_size: usize,
}

impl IntakeResolver {
    pub fn new(
        storage: Storage,
        client: Client,
        allowed_extensions: Vec<String>,
        chunk_size: usize,
    ) -> Self {
        Self {
            storage,
            client,
            allowed_extensions,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Resolve `request` into exactly one file in the incoming area.
    pub async fn resolve(
        &self,
        request: Option<ConversionRequest>,
    ) -> Result<StoredFile, IntakeError> {
        match request {
            Some(ConversionRequest::UploadedFile { filename, bytes }) => {
                self.save_upload(&filename, &bytes).await
            }
            Some(ConversionRequest::RemoteUrl { url }) => self.fetch_remote(&url).await,
            None => Err(IntakeError::NoValidAction),
        }
    }

    async fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<StoredFile, IntakeError> {
        if filename.is_empty() {
            return Err(IntakeError::NoFileSelected);
        }
        if !is_allowed_file(filename, &self.allowed_extensions) {
            debug!(filename, "rejected upload extension");
            return Err(IntakeError::UnsupportedFormat);
        }
        let filename = sanitize_filename(filename).ok_or(IntakeError::NoFileSelected)?;
        let path = self.storage.incoming_path(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(IntakeError::Save)?;

        info!(
            filename = %filename,
            path = %path.display(),
            size_bytes = bytes.len(),
            "saved uploaded file"
        );
        Ok(StoredFile { filename, path })
    }

    async fn fetch_remote(&self, url: &str) -> Result<StoredFile, IntakeError> {
        if url.trim().is_empty() {
            return Err(IntakeError::NoUrl);
        }

        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            warn!(url, status = %response.status(), "remote download refused");
            return Err(IntakeError::DownloadStatus {
                status: response.status(),
            });
        }

        let filename =
            sanitize_filename(filename_from_url(url)).ok_or(IntakeError::UnnamedUrl)?;
        let path = self.storage.incoming_path(&filename);

        let file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| IntakeError::Url(e.to_string()))?;
        let mut writer = BufWriter::with_capacity(self.chunk_size, file);
        let mut written: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| IntakeError::Url(e.to_string()))?;
            written += chunk.len() as u64;
        }
        writer
            .flush()
            .await
            .map_err(|e| IntakeError::Url(e.to_string()))?;

        info!(
            url,
            filename = %filename,
            path = %path.display(),
            size_bytes = written,
            "downloaded remote file"
        );
        Ok(StoredFile { filename, path })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::Router;
    use bytes::Bytes;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    fn allowed() -> Vec<String> {
        crate::config::DEFAULT_ALLOWED_EXTENSIONS
            .iter()
            .map(|s| (*s).to_owned())
            .collect()
    }

    fn resolver(root: &std::path::Path) -> IntakeResolver {
        let storage = Storage::new(root.join("uploads"), root.join("converted"));
        std::fs::create_dir_all(storage.incoming_dir()).unwrap();
        std::fs::create_dir_all(storage.converted_dir()).unwrap();
        let client = Client::builder().no_proxy().build().unwrap();
        IntakeResolver::new(storage, client, allowed(), 8192)
    }

    /// Serve `/tracks/demo.wav` (200) and `/missing.wav` (404) on a random port.
    async fn spawn_remote() -> String {
        let app = Router::new()
            .route("/tracks/demo.wav", get(|| async { Bytes::from_static(b"RIFFdemo") }))
            .route("/missing.wav", get(|| async { AxumStatus::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{addr}")
    }

    proptest! {
        #[test]
        fn allowed_extensions_pass_in_any_case(
            stem in "[a-zA-Z0-9_]{1,12}",
            ext in prop::sample::select(vec!["mp3", "wav", "ogg", "flac"]),
            upper in prop::collection::vec(any::<bool>(), 4),
        ) {
            let ext: String = ext
                .chars()
                .zip(upper.iter().cycle())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();
            let name = format!("{stem}.{ext}");
            prop_assert!(is_allowed_file(&name, &allowed()));
        }

        #[test]
        fn other_extensions_fail(
            stem in "[a-zA-Z0-9_]{1,12}",
            ext in "[a-z0-9]{1,5}",
        ) {
            prop_assume!(!["mp3", "wav", "ogg", "flac"].contains(&ext.as_str()));
            let name = format!("{stem}.{ext}");
            prop_assert!(!is_allowed_file(&name, &allowed()));
        }

        #[test]
        fn names_without_a_dot_fail(stem in "[a-zA-Z0-9_]{0,12}") {
            prop_assert!(!is_allowed_file(&stem, &allowed()));
        }
    }

    #[test]
    fn only_the_last_extension_counts() {
        assert!(is_allowed_file("archive.tar.MP3", &allowed()));
        assert!(!is_allowed_file("song.mp3.exe", &allowed()));
        assert!(!is_allowed_file("mp3", &allowed()));
        assert!(!is_allowed_file("song.", &allowed()));
    }

    #[test]
    fn url_filename_is_last_segment() {
        assert_eq!(filename_from_url("https://example.com/tracks/demo.wav"), "demo.wav");
        assert_eq!(filename_from_url("https://example.com/tracks/"), "");
        assert_eq!(filename_from_url("demo.wav"), "demo.wav");
    }

    #[tokio::test]
    async fn missing_request_shape_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let intake = resolver(root.path());
        let err = intake.resolve(None).await.unwrap_err();
        assert!(matches!(err, IntakeError::NoValidAction));
        assert_eq!(std::fs::read_dir(root.path().join("uploads")).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn empty_filename_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let err = resolver(root.path())
            .resolve(Some(ConversionRequest::UploadedFile {
                filename: String::new(),
                bytes: Bytes::from_static(b"data"),
            }))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no file selected");
    }

    #[tokio::test]
    async fn disallowed_upload_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let err = resolver(root.path())
            .resolve(Some(ConversionRequest::UploadedFile {
                filename: "notes.txt".into(),
                bytes: Bytes::from_static(b"data"),
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedFormat));
        assert!(!root.path().join("uploads/notes.txt").exists());
    }

    #[tokio::test]
    #[traced_test]
    async fn upload_is_saved_under_its_name() {
        let root = tempfile::tempdir().unwrap();
        let stored = resolver(root.path())
            .resolve(Some(ConversionRequest::UploadedFile {
                filename: "song.MP3".into(),
                bytes: Bytes::from_static(b"ID3"),
            }))
            .await
            .unwrap();
        assert_eq!(stored.filename, "song.MP3");
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"ID3");
    }

    #[tokio::test]
    async fn blank_url_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let err = resolver(root.path())
            .resolve(Some(ConversionRequest::RemoteUrl { url: "   ".into() }))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::NoUrl));
    }

    #[tokio::test]
    #[traced_test]
    async fn remote_file_is_streamed_to_disk() {
        let root = tempfile::tempdir().unwrap();
        let base = spawn_remote().await;
        let stored = resolver(root.path())
            .resolve(Some(ConversionRequest::RemoteUrl {
                url: format!("{base}/tracks/demo.wav"),
            }))
            .await
            .unwrap();
        assert_eq!(stored.filename, "demo.wav");
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"RIFFdemo");
    }

    #[tokio::test]
    #[traced_test]
    async fn remote_404_is_a_download_failure() {
        let root = tempfile::tempdir().unwrap();
        let base = spawn_remote().await;
        let err = resolver(root.path())
            .resolve(Some(ConversionRequest::RemoteUrl {
                url: format!("{base}/missing.wav"),
            }))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IntakeError::DownloadStatus { status } if status == StatusCode::NOT_FOUND
        ));
        assert!(!root.path().join("uploads/missing.wav").exists());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_url_error() {
        let root = tempfile::tempdir().unwrap();
        // Bind then drop to get a port nothing listens on.
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let err = resolver(root.path())
            .resolve(Some(ConversionRequest::RemoteUrl {
                url: format!("http://127.0.0.1:{port}/a.wav"),
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::Url(_)));
        assert!(err.to_string().starts_with("error processing the URL"));
    }

    /// Uploads are extension-checked but URL sources are not.
    #[tokio::test]
    async fn url_branch_skips_extension_check() {
        let root = tempfile::tempdir().unwrap();
        let app = Router::new().route("/clip.txt", get(|| async { "not audio" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let intake = resolver(root.path());
        let stored = intake
            .resolve(Some(ConversionRequest::RemoteUrl {
                url: format!("http://{addr}/clip.txt"),
            }))
            .await
            .unwrap();
        assert_eq!(stored.filename, "clip.txt");

        let err = intake
            .resolve(Some(ConversionRequest::UploadedFile {
                filename: "clip.txt".into(),
                bytes: Bytes::from_static(b"not audio"),
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, IntakeError::UnsupportedFormat));
    }
}
