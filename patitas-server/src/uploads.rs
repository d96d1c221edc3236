//! Local-disk image store for pet photos.
//!
//! Files land under `<root>/mascotas/` with a fresh UUID name and are served
//! statically at `/uploads/mascotas/<file>`.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Content types accepted for pet images
const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// File extensions accepted for pet images
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Subdirectory for pet images
const PETS_SUBDIR: &str = "mascotas";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid image type; only JPG/JPEG or PNG are allowed")]
    InvalidContentType,

    #[error("invalid image extension; only .jpg, .jpeg or .png are allowed")]
    InvalidExtension,

    #[error("invalid file name")]
    InvalidFilename,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores uploaded images on local disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store a pet image and return its public URL path.
    ///
    /// Validates both the declared content type and the original file's
    /// extension; `jpeg` is normalized to `jpg` so stored names have one
    /// canonical variant.
    pub async fn store_pet_image(
        &self,
        original_filename: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, UploadError> {
        let content_type = content_type.to_ascii_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(UploadError::InvalidContentType);
        }

        let mut ext = extension_of(original_filename)
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .ok_or(UploadError::InvalidExtension)?;
        if ext == "jpeg" {
            ext = "jpg".to_owned();
        }

        let dir = self.root.join(PETS_SUBDIR);
        tokio::fs::create_dir_all(&dir).await?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let target = dir.join(&filename);

        // Guard against path traversal in the generated target
        if !target.starts_with(&dir) {
            return Err(UploadError::InvalidFilename);
        }

        tokio::fs::write(&target, bytes).await?;

        Ok(format!("/uploads/{}/{}", PETS_SUBDIR, filename))
    }
}

/// Lowercased extension of a filename, if any.
fn extension_of(filename: &str) -> Option<String> {
    let dot = filename.rfind('.')?;
    let ext = &filename[dot + 1..];
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_parsing() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("a.b.png").as_deref(), Some("png"));
        assert_eq!(extension_of("no-extension"), None);
        assert_eq!(extension_of("trailing-dot."), None);
    }

    #[tokio::test]
    async fn stores_and_normalizes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let url = store
            .store_pet_image("dog.jpeg", "image/jpeg", b"fake-image-bytes")
            .await
            .unwrap();

        assert!(url.starts_with("/uploads/mascotas/"));
        assert!(url.ends_with(".jpg"));

        let on_disk = dir
            .path()
            .join("mascotas")
            .join(url.rsplit('/').next().unwrap());
        let contents = std::fs::read(on_disk).unwrap();
        assert_eq!(contents, b"fake-image-bytes");
    }

    #[tokio::test]
    async fn rejects_bad_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store
            .store_pet_image("dog.gif", "image/gif", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidContentType));
    }

    #[tokio::test]
    async fn rejects_mismatched_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let err = store
            .store_pet_image("dog.gif", "image/png", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidExtension));
    }
}
