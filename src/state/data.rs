/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog layer and the UI layer.

use std::path::Path;

use bytes::Bytes;
use image::ImageFormat;
use thiserror::Error;

/// Errors raised while turning a picked file into an `ImageFile`
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be read from disk
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not in any image format we recognise
    #[error("{0} is not an image")]
    NotAnImage(String),
}

/// An uploaded file: original name, MIME type and its bytes
///
/// The bytes are reference-counted, so records can be cloned freely
/// between the catalog, the controller and the view's image handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Original filename (e.g., "holiday.png")
    pub name: String,
    /// MIME type (e.g., "image/png")
    pub mime_type: String,
    /// Raw file contents
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a picked file from disk
    ///
    /// The MIME type is sniffed from the contents first and from the
    /// extension second. Anything that is not an image is rejected.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| FileError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self::from_bytes(name, bytes, ImageFormat::from_path(path).ok())
    }

    /// Build an `ImageFile` from bytes already in memory
    pub fn from_bytes(
        name: String,
        bytes: Vec<u8>,
        extension_hint: Option<ImageFormat>,
    ) -> Result<Self, FileError> {
        let format = image::guess_format(&bytes)
            .ok()
            .or(extension_hint)
            .ok_or_else(|| FileError::NotAnImage(name.clone()))?;

        Ok(Self::new(name, format.to_mime_type(), bytes))
    }
}

/// Represents a single image in the gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    /// Catalog key, `None` until the record has been stored
    pub id: Option<i64>,
    /// The stored file
    pub file: ImageFile,
    /// Insertion time, ISO-8601 UTC with milliseconds (e.g., "2024-05-01T12:34:56.789Z")
    pub timestamp: String,
}
