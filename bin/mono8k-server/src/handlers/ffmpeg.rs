use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ConvertError {
    /// ffmpeg ran and exited non-zero; carries its stderr verbatim.
    #[error("conversion error: {stderr}")]
    Failed { stderr: String },

    /// ffmpeg could not be started at all.
    #[error("conversion error: failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Turns a source audio file into the normalized output format.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn convert(&self, source: &Path, destination: &Path) -> Result<(), ConvertError>;
}

/// [`AudioConverter`] backed by the ffmpeg command-line tool.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    program: PathBuf,
    sample_rate: u32,
    channels: u16,
}

impl FfmpegConverter {
    pub fn new(program: impl Into<PathBuf>, sample_rate: u32, channels: u16) -> Self {
        Self {
            program: program.into(),
            sample_rate,
            channels,
        }
    }

    /// Argument list: `-i <source> -ar <rate> -ac <channels> <destination> -y`.
    pub fn build_args(&self, source: &Path, destination: &Path) -> Vec<String> {
        vec![
            "-i".to_owned(),
            source.to_string_lossy().into_owned(),
            "-ar".to_owned(),
            self.sample_rate.to_string(),
            "-ac".to_owned(),
            self.channels.to_string(),
            destination.to_string_lossy().into_owned(),
            "-y".to_owned(),
        ]
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, source: &Path, destination: &Path) -> Result<(), ConvertError> {
        let args = self.build_args(source, destination);
        debug!(program = %self.program.display(), ?args, "spawning ffmpeg");

        let output = tokio::process::Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ConvertError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if output.status.success() {
            info!(destination = %destination.display(), "ffmpeg conversion succeeded");
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            warn!(status = ?output.status.code(), error = %stderr, "ffmpeg conversion failed");
            Err(ConvertError::Failed { stderr })
        }
    }
}

/// Make sure an ffmpeg binary is available, downloading the sidecar build
/// when none is installed.
pub async fn provision_ffmpeg() -> anyhow::Result<()> {
    tokio::task::spawn_blocking(|| -> anyhow::Result<()> {
        if ffmpeg_sidecar::command::ffmpeg_is_installed() {
            return Ok(());
        }
        info!("ffmpeg not found; downloading a static build");
        ffmpeg_sidecar::download::auto_download()?;
        info!(path = %ffmpeg_sidecar::paths::ffmpeg_path().display(), "ffmpeg installed");
        Ok(())
    })
    .await?
}
