//! Core configuration.

use vproc_storage::{DEFAULT_DOWNLOAD_EXPIRY_MINUTES, MAX_EXPIRY_MINUTES};

/// Default upload limit (500 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

const DEFAULT_ALLOWED_CONTENT_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/x-matroska",
    "video/webm",
];

/// Processing core configuration.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: u64,
    /// Allowed file extensions (lowercase, no dot)
    pub allowed_extensions: Vec<String>,
    /// Allowed (normalized) video content types
    pub allowed_content_types: Vec<String>,
    /// Lifetime of minted download URLs
    pub download_url_expiry_minutes: u32,
    /// Delay before a retried job becomes visible to the consumer (0 = immediate)
    pub retry_delay_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            allowed_content_types: DEFAULT_ALLOWED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            download_url_expiry_minutes: DEFAULT_DOWNLOAD_EXPIRY_MINUTES,
            retry_delay_secs: 0,
        }
    }
}

impl CoreConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_upload_bytes: std::env::var("VPROC_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            allowed_extensions: std::env::var("VPROC_ALLOWED_EXTENSIONS")
                .map(|s| parse_list(&s, |item| item.trim_start_matches('.').to_string()))
                .unwrap_or(defaults.allowed_extensions),
            allowed_content_types: std::env::var("VPROC_ALLOWED_CONTENT_TYPES")
                .map(|s| parse_list(&s, str::to_string))
                .unwrap_or(defaults.allowed_content_types),
            download_url_expiry_minutes: std::env::var("VPROC_DOWNLOAD_URL_EXPIRY_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.download_url_expiry_minutes)
                .clamp(1, MAX_EXPIRY_MINUTES),
            retry_delay_secs: std::env::var("VPROC_RETRY_DELAY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.retry_delay_secs),
        }
    }

    /// Override the upload limit.
    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Override the download URL lifetime.
    pub fn with_download_url_expiry_minutes(mut self, minutes: u32) -> Self {
        self.download_url_expiry_minutes = minutes.clamp(1, MAX_EXPIRY_MINUTES);
        self
    }

    /// Override the retry delay.
    pub fn with_retry_delay_secs(mut self, secs: u64) -> Self {
        self.retry_delay_secs = secs;
        self
    }
}

/// Split a comma-separated list, lowercasing and dropping empty items.
fn parse_list(raw: &str, map: impl Fn(&str) -> String) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .map(|s| map(&s))
        .collect()
}
