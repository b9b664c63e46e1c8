//! Upload directory holding garment photos.
//!
//! Files are stored under a fresh UUID name so two uploads called
//! `shirt.jpg` never collide. The database keeps the name relative to the
//! upload root.

use crate::error::{Result, StoreError};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Image extensions accepted for garments (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

/// An image read from the caller's path, not yet stored.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    /// SHA-256 of `bytes`, lowercase hex.
    pub hash: String,
    /// Lowercased extension, possibly empty.
    pub extension: String,
    pub original_name: String,
}

impl SourceImage {
    pub fn has_allowed_extension(&self) -> bool {
        is_allowed_extension(&self.extension)
    }
}

pub fn is_allowed_extension(extension: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    /// Use `root` as the upload directory, creating it if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::info!(path = %root.display(), "upload directory ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read and hash the file at `source`.
    pub fn read_source(&self, source: &Path) -> Result<SourceImage> {
        let original_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| StoreError::MissingFileName(source.display().to_string()))?
            .to_string();
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let bytes = std::fs::read(source)?;
        let hash = sha256_hex(&bytes);
        tracing::debug!(source = %source.display(), size = bytes.len(), %hash, "read source image");

        Ok(SourceImage {
            bytes,
            hash,
            extension,
            original_name,
        })
    }

    /// Write the image under a new unique name. Returns that name.
    pub fn save(&self, image: &SourceImage) -> Result<String> {
        let name = if image.extension.is_empty() {
            uuid::Uuid::new_v4().to_string()
        } else {
            format!("{}.{}", uuid::Uuid::new_v4(), image.extension)
        };
        std::fs::write(self.root.join(&name), &image.bytes)?;
        tracing::debug!(name = %name, original = %image.original_name, "image saved");
        Ok(name)
    }

    /// Absolute location of a stored image name.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Remove a stored image. Returns `false` if it was already gone.
    pub fn remove(&self, name: &str) -> Result<bool> {
        match std::fs::remove_file(self.resolve(name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
