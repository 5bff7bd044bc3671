//! Object storage boundary.
//!
//! This crate provides:
//! - The `ObjectStorage` port used by the processing core
//! - Object key helpers (filename sanitization, upload keys)
//! - HMAC-signed download tokens
//! - An in-memory backend for local runs and tests

pub mod error;
pub mod memory;
pub mod storage;
pub mod token;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryStorage;
pub use storage::{
    clamp_expiry_minutes, sanitize_filename, upload_key, ObjectInfo, ObjectStorage,
    DEFAULT_DOWNLOAD_EXPIRY_MINUTES, MAX_EXPIRY_MINUTES,
};
pub use token::DownloadToken;
