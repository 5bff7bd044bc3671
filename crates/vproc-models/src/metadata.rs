//! Uploaded file metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Immutable description of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FileMetadata {
    /// Filename as supplied by the uploader
    original_filename: String,
    /// Size in bytes (always > 0)
    size_bytes: u64,
    /// Declared format, i.e. the lowercase file extension
    format: String,
    /// Normalized MIME type sniffed from the bytes, not the uploader's claim
    content_type: String,
    /// Opaque object-storage reference for the original upload
    storage_ref: String,
}

impl FileMetadata {
    /// Create metadata, enforcing `size_bytes > 0` and a non-empty storage reference.
    pub fn new(
        original_filename: impl Into<String>,
        size_bytes: u64,
        content_type: impl Into<String>,
        storage_ref: impl Into<String>,
    ) -> ModelResult<Self> {
        let original_filename = original_filename.into();
        let storage_ref = storage_ref.into();

        if size_bytes == 0 {
            return Err(ModelError::invalid_metadata("size must be greater than zero"));
        }
        if storage_ref.trim().is_empty() {
            return Err(ModelError::invalid_metadata("storage reference must not be empty"));
        }

        Ok(Self {
            format: file_extension(&original_filename).unwrap_or_default(),
            original_filename,
            size_bytes,
            content_type: content_type.into(),
            storage_ref,
        })
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn storage_ref(&self) -> &str {
        &self.storage_ref
    }
}

/// Lowercase extension of `filename`, without the dot.
///
/// Returns `None` for names without an extension or with a trailing dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}
