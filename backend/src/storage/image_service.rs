//! # Image Service
//!
//! Stores review photos as base64 text files under the documents root.
//!
//! ## File Structure
//!
//! ```text
//! <documents>/
//! └── escape-room-tracker/
//!     └── images/
//!         ├── 1705276800000_6f1c…e2.jpg
//!         └── 1705276800000_6f1c…e2_thumb.jpg
//! ```
//!
//! Paths handed out and accepted by this service are relative to the
//! documents root, e.g. `escape-room-tracker/images/1705276800000_6f1c…e2.jpg`.
//!
//! Thumbnails are plain copies and compression returns its input: neither
//! resizes nor re-encodes anything.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use shared::ImageUploadResult;
use std::fs;
use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

/// Image directory relative to the documents root
pub const IMAGE_DIRECTORY: &str = "escape-room-tracker/images";

/// Quality used when the caller does not pick one
pub const DEFAULT_COMPRESSION_QUALITY: f32 = 0.8;

static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/[a-z]+;base64,").expect("static regex is valid"));

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ImagePathError {
    #[error("Image path must be relative: {0}")]
    Absolute(String),
    #[error("Image path must not leave the documents directory: {0}")]
    Traversal(String),
    #[error("Image path is empty")]
    Empty,
    #[error("Image path must be inside escape-room-tracker/images: {0}")]
    OutsideImageDirectory(String),
}

#[derive(Clone, Debug)]
pub struct ImageService {
    documents_dir: PathBuf,
}

impl ImageService {
    /// Create an image service rooted at `documents_dir`, creating the image
    /// directory if needed
    pub fn new<P: AsRef<Path>>(documents_dir: P) -> Result<Self> {
        let service = Self {
            documents_dir: documents_dir.as_ref().to_path_buf(),
        };
        service.ensure_directory_exists()?;
        Ok(service)
    }

    fn ensure_directory_exists(&self) -> Result<()> {
        let dir = self.documents_dir.join(IMAGE_DIRECTORY);
        if dir.exists() {
            debug!("Image directory already exists: {}", dir.display());
            return Ok(());
        }

        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create image directory {}", dir.display()))?;
        info!("Created image directory: {}", dir.display());
        Ok(())
    }

    /// Drop a leading `data:image/<type>;base64,` prefix if present
    pub fn strip_data_url_prefix(image_data: &str) -> &str {
        match DATA_URL_PREFIX.find(image_data) {
            Some(m) => &image_data[m.end()..],
            None => image_data,
        }
    }

    /// Save base64 image data (optionally as a data URL) and return its path
    pub async fn save_image(&self, image_data: &str) -> Result<String> {
        let result: Result<String> = async {
            let file_name = format!("{}_{}.jpg", Utc::now().timestamp_millis(), Uuid::new_v4());
            let file_path = format!("{}/{}", IMAGE_DIRECTORY, file_name);

            let base64_data = Self::strip_data_url_prefix(image_data);
            fs::write(self.documents_dir.join(&file_path), base64_data)?;

            info!("Saved image {} ({} base64 chars)", file_path, base64_data.len());
            Ok(file_path)
        }
        .await;

        result
            .inspect_err(|e| error!("Error saving image: {:#}", e))
            .context("Failed to save image")
    }

    /// Encode raw image bytes as base64 and save them
    pub async fn save_image_bytes(&self, bytes: &[u8]) -> Result<String> {
        self.save_image(&STANDARD.encode(bytes)).await
    }

    /// Read an image back as a `data:image/jpeg;base64,` URL
    pub async fn get_image(&self, path: &str) -> Result<String> {
        let data = self.read_stored_text(path)?;
        Ok(format!("data:image/jpeg;base64,{}", data))
    }

    /// Read an image and decode it to raw bytes
    pub async fn read_image_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let data = self.read_stored_text(path)?;
        STANDARD
            .decode(data.trim())
            .inspect_err(|e| error!("Image at path {} is not valid base64: {}", path, e))
            .with_context(|| format!("Failed to read image: {}", path))
    }

    pub async fn delete_image(&self, path: &str) -> Result<()> {
        let result: Result<()> = (|| {
            let full_path = self.resolve(path)?;
            fs::remove_file(&full_path)?;
            Ok(())
        })();

        result
            .inspect_err(|e| error!("Error deleting image at path {}: {:#}", path, e))
            .with_context(|| format!("Failed to delete image: {}", path))?;

        info!("Deleted image {}", path);
        Ok(())
    }

    /// Store a thumbnail next to the image and return its path.
    ///
    /// The thumbnail is a full-size copy; the first `.jpg` in the path
    /// becomes `_thumb.jpg`.
    pub async fn generate_thumbnail(&self, image_path: &str) -> Result<String> {
        let result: Result<String> = async {
            let original = self.get_image(image_path).await?;
            let thumbnail_path = image_path.replacen(".jpg", "_thumb.jpg", 1);
            if thumbnail_path == image_path {
                return Err(anyhow::anyhow!("Image path has no .jpg extension: {}", image_path));
            }

            let base64_data = Self::strip_data_url_prefix(&original);
            fs::write(self.resolve(&thumbnail_path)?, base64_data)?;
            Ok(thumbnail_path)
        }
        .await;

        result
            .inspect_err(|e| error!("Error generating thumbnail: {:#}", e))
            .context("Failed to generate thumbnail")
    }

    /// Compression hook. Returns the input unchanged; `quality` (default 0.8)
    /// is accepted for API compatibility.
    pub fn compress_image(&self, image_data: &str, quality: Option<f32>) -> String {
        let quality = quality.unwrap_or(DEFAULT_COMPRESSION_QUALITY);
        debug!("Compressing image at quality {} (pass-through)", quality);
        image_data.to_string()
    }

    /// Compress, save and thumbnail an uploaded image in one go
    pub async fn upload(&self, image_data: &str, quality: Option<f32>) -> Result<ImageUploadResult> {
        let original_size = decoded_size(Self::strip_data_url_prefix(image_data));
        let compressed = self.compress_image(image_data, quality);
        let compressed_size = decoded_size(Self::strip_data_url_prefix(&compressed));

        let path = self.save_image(&compressed).await?;
        let thumbnail_path = match self.generate_thumbnail(&path).await {
            Ok(thumb) => Some(thumb),
            Err(e) => {
                warn!("Continuing without thumbnail for {}: {:#}", path, e);
                None
            }
        };

        Ok(ImageUploadResult {
            path,
            thumbnail_path,
            original_size,
            compressed_size: Some(compressed_size),
        })
    }

    fn read_stored_text(&self, path: &str) -> Result<String> {
        let result: Result<String> = (|| {
            let full_path = self.resolve(path)?;
            Ok(fs::read_to_string(&full_path)?)
        })();

        result
            .inspect_err(|e| error!("Error reading image at path {}: {:#}", path, e))
            .with_context(|| format!("Failed to read image: {}", path))
    }

    /// Resolve an image path against the documents root
    fn resolve(&self, path: &str) -> Result<PathBuf, ImagePathError> {
        validate_image_location(path)?;
        Ok(self.documents_dir.join(path))
    }
}

/// Accept only plain relative paths
pub fn validate_relative_path(path: &str) -> Result<(), ImagePathError> {
    if path.trim().is_empty() {
        return Err(ImagePathError::Empty);
    }

    let candidate = Path::new(path);
    if candidate.is_absolute() || path.starts_with('/') || path.starts_with('\\') {
        return Err(ImagePathError::Absolute(path.to_string()));
    }

    for component in candidate.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => return Err(ImagePathError::Traversal(path.to_string())),
            Component::RootDir | Component::Prefix(_) => {
                return Err(ImagePathError::Absolute(path.to_string()))
            }
        }
    }

    Ok(())
}

/// Accept only relative paths to a file below [`IMAGE_DIRECTORY`]
pub fn validate_image_location(path: &str) -> Result<(), ImagePathError> {
    validate_relative_path(path)?;

    let mut components = Path::new(path)
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    let in_image_directory = IMAGE_DIRECTORY
        .split('/')
        .all(|dir| matches!(components.next(), Some(Component::Normal(name)) if name == dir));

    if in_image_directory && components.next().is_some() {
        Ok(())
    } else {
        Err(ImagePathError::OutsideImageDirectory(path.to_string()))
    }
}

/// Byte length of decoded base64 text, estimated from its length when the
/// text does not decode cleanly
fn decoded_size(base64_data: &str) -> usize {
    match STANDARD.decode(base64_data.trim()) {
        Ok(bytes) => bytes.len(),
        Err(_) => base64_data.len() * 3 / 4,
    }
}
