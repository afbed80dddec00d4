//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

/// Upload extensions accepted when no `MONO8K_ALLOWED_EXTENSIONS` is set.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac"];

/// Runtime configuration for mono8k-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins. `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Directory holding sources waiting for conversion.
    pub incoming_dir: PathBuf,

    /// Directory holding converted outputs. Never cleaned automatically.
    pub converted_dir: PathBuf,

    /// Lower-cased extensions accepted on the upload branch.
    pub allowed_extensions: Vec<String>,

    /// ffmpeg executable used by the converter.
    pub ffmpeg_program: PathBuf,

    /// Download a static ffmpeg build at startup when none is installed.
    pub ffmpeg_auto_download: bool,

    /// Target sample rate passed as `-ar`.
    pub sample_rate: u32,

    /// Target channel count passed as `-ac`.
    pub channels: u16,

    /// Write buffer size used while streaming a remote download to disk.
    pub fetch_chunk_size: usize,

    /// Maximum multipart body size in MiB.
    pub max_upload_size_mb: usize,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("MONO8K_BIND", "0.0.0.0:5000"),
            log_level: env_or("MONO8K_LOG", "info"),
            log_json: env_flag("MONO8K_LOG_JSON"),
            cors_allowed_origins: std::env::var("MONO8K_CORS_ORIGINS").ok(),
            incoming_dir: PathBuf::from(env_or("MONO8K_INCOMING_DIR", "uploads")),
            converted_dir: PathBuf::from(env_or("MONO8K_CONVERTED_DIR", "converted")),
            allowed_extensions: std::env::var("MONO8K_ALLOWED_EXTENSIONS")
                .map(|v| parse_extensions(&v))
                .unwrap_or_else(|_| default_extensions()),
            ffmpeg_program: std::env::var("MONO8K_FFMPEG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| ffmpeg_sidecar::paths::ffmpeg_path()),
            ffmpeg_auto_download: env_flag("MONO8K_FFMPEG_AUTO_DOWNLOAD"),
            sample_rate: parse_env("MONO8K_SAMPLE_RATE", 8000),
            channels: parse_env("MONO8K_CHANNELS", 1),
            fetch_chunk_size: parse_env("MONO8K_FETCH_CHUNK_SIZE", 8192),
            max_upload_size_mb: parse_env("MONO8K_MAX_UPLOAD_SIZE_MB", 100),
        }
    }

    /// Upload body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            cors_allowed_origins: None,
            incoming_dir: PathBuf::from("uploads"),
            converted_dir: PathBuf::from("converted"),
            allowed_extensions: default_extensions(),
            ffmpeg_program: PathBuf::from("ffmpeg"),
            ffmpeg_auto_download: false,
            sample_rate: 8000,
            channels: 1,
            fetch_chunk_size: 8192,
            max_upload_size_mb: 100,
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

fn default_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| (*ext).to_owned())
        .collect()
}

fn parse_extensions(raw: &str) -> Vec<String> {
    let parsed: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if parsed.is_empty() {
        default_extensions()
    } else {
        parsed
    }
}
