//! Flat directory store addressed purely by filename

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::storage::filename::sanitize_filename;

/// A directory of files looked up by sanitized name
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a new store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure the storage directory exists
    pub async fn ensure_dir(&self) -> Result<()> {
        if !fs::try_exists(&self.root).await? {
            fs::create_dir_all(&self.root).await?;
            debug!(path = ?self.root, "Created storage directory");
        }
        Ok(())
    }

    /// Write `data` under `filename`, replacing any existing file
    pub async fn save(&self, filename: &str, data: &[u8]) -> Result<PathBuf> {
        self.ensure_dir().await?;

        let file_path = self.path_for(filename)?;
        fs::write(&file_path, data).await?;

        debug!(path = ?file_path, size = data.len(), "Saved file");

        Ok(file_path)
    }

    /// Read a stored file; a missing file is reported as `NotFound`
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>> {
        let file_path = self.path_for(filename)?;

        fs::read(&file_path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => AppError::NotFound(filename.to_string()),
            _ => AppError::Io(e),
        })
    }

    /// Check whether `filename` is present in the store
    pub async fn exists(&self, filename: &str) -> bool {
        match self.path_for(filename) {
            Ok(path) => fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Resolve a filename inside the store.
    ///
    /// Only names that survive sanitizing unchanged are accepted, which keeps
    /// every lookup inside `root`.
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty() || sanitize_filename(filename) != filename {
            return Err(AppError::MalformedRequest(format!(
                "invalid filename '{}'",
                filename
            )));
        }
        Ok(self.root.join(filename))
    }
}

/// Detect image format from binary data using magic bytes
pub fn detect_image_format(data: &[u8]) -> Option<&'static str> {
    if data.len() < 8 {
        return None;
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        return Some("png");
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("jpg");
    }

    // WebP: RIFF....WEBP
    if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
        return Some("webp");
    }

    None
}
