//! Incoming / converted directories on local disk.
//!
//! The filesystem is the only datastore: a file is identified by its name
//! inside one of the two areas and nothing else is tracked.

use std::path::{Path, PathBuf};

/// Prefix given to every converted output.
pub const CONVERTED_PREFIX: &str = "converted_";

#[derive(Debug, Clone)]
pub struct Storage {
    incoming: PathBuf,
    converted: PathBuf,
}

impl Storage {
    pub fn new(incoming: impl Into<PathBuf>, converted: impl Into<PathBuf>) -> Self {
        Self {
            incoming: incoming.into(),
            converted: converted.into(),
        }
    }

    /// Create both areas if they are missing.
    pub async fn ensure_dirs(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.incoming).await?;
        tokio::fs::create_dir_all(&self.converted).await?;
        Ok(())
    }

    pub fn incoming_dir(&self) -> &Path {
        &self.incoming
    }

    pub fn converted_dir(&self) -> &Path {
        &self.converted
    }

    /// Path of a source file in the incoming area.
    pub fn incoming_path(&self, filename: &str) -> PathBuf {
        self.incoming.join(filename)
    }

    /// Path of the converted output for `filename`.
    pub fn converted_path(&self, filename: &str) -> PathBuf {
        self.converted.join(format!("{CONVERTED_PREFIX}{filename}"))
    }
}

/// Reduce a caller-supplied name to a single safe path component.
///
/// Characters outside `[A-Za-z0-9._-]` become `_`, so directory separators
/// can never escape the storage area. Returns `None` for names that are
/// empty or made only of dots.
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.chars().all(|c| c == '.') {
        None
    } else {
        Some(cleaned)
    }
}
