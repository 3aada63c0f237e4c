//! On-disk store for compressed gallery photos

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::compression::ProcessedImage;
use crate::common::{generate_raw_id, ApiError};

/// Public path prefix under which stored photos are served
pub const PUBLIC_PREFIX: &str = "/uploads/gallery";

#[derive(Debug, Clone)]
pub struct GalleryStorage {
    dir: PathBuf,
}

/// A photo written to disk
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
    pub file_size: i64,
}

impl GalleryStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn save(&self, image: &ProcessedImage) -> Result<StoredFile, ApiError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            warn!(error = %e, dir = %self.dir.display(), "Failed to create gallery directory");
            ApiError::InternalServer("Failed to save image".to_string())
        })?;

        let filename = format!("{}.{}", generate_raw_id(16), ProcessedImage::EXTENSION);
        tokio::fs::write(self.dir.join(&filename), &image.bytes)
            .await
            .map_err(|e| {
                warn!(error = %e, filename = %filename, "Failed to write gallery image");
                ApiError::InternalServer("Failed to save image".to_string())
            })?;

        Ok(StoredFile {
            url: format!("{}/{}", PUBLIC_PREFIX, filename),
            file_size: image.bytes.len() as i64,
            filename,
        })
    }

    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let path = self.resolve(filename)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ApiError::NotFound("Image not found".to_string()))
            }
            Err(e) => {
                warn!(error = %e, filename = %filename, "Failed to read gallery image");
                Err(ApiError::InternalServer("Failed to read image".to_string()))
            }
        }
    }

    /// Best-effort removal; a missing file is not an error
    pub async fn remove(&self, filename: &str) -> bool {
        let Ok(path) = self.resolve(filename) else {
            return false;
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(error = %e, filename = %filename, "Failed to remove gallery image");
                false
            }
        }
    }

    pub async fn remove_all(&self, filenames: &[String]) -> usize {
        let mut removed = 0;
        for filename in filenames {
            if self.remove(filename).await {
                removed += 1;
            }
        }
        info!(removed, requested = filenames.len(), "Removed gallery files");
        removed
    }

    fn resolve(&self, filename: &str) -> Result<PathBuf, ApiError> {
        if !is_safe_filename(filename) {
            return Err(ApiError::BadRequest("Invalid filename".to_string()));
        }
        Ok(self.dir.join(filename))
    }
}

/// Stored names are generated ids plus an extension, nothing else
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename.len() <= 64
        && !filename.starts_with('.')
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
        && !filename.contains("..")
}
