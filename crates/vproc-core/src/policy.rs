//! Upload acceptance rules.

use vproc_models::{file_extension, Rejection};

use crate::config::CoreConfig;
use crate::detect::normalize_content_type;

/// Size, extension and content-type rules applied to every upload.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_upload_bytes: u64,
    allowed_extensions: Vec<String>,
    allowed_content_types: Vec<String>,
}

impl UploadPolicy {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            max_upload_bytes: config.max_upload_bytes,
            allowed_extensions: config.allowed_extensions.clone(),
            allowed_content_types: config
                .allowed_content_types
                .iter()
                .map(|t| normalize_content_type(t))
                .collect(),
        }
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Check the upload size.
    ///
    /// Both the declared length and the number of bytes actually received
    /// count: either being zero makes the file empty, and the larger of the
    /// two is compared against the limit.
    pub fn check_size(&self, declared_bytes: u64, actual_bytes: u64) -> Result<(), Rejection> {
        if declared_bytes == 0 || actual_bytes == 0 {
            return Err(Rejection::EmptyFile);
        }

        let size_bytes = declared_bytes.max(actual_bytes);
        if size_bytes > self.max_upload_bytes {
            return Err(Rejection::FileTooLarge {
                size_bytes,
                max_bytes: self.max_upload_bytes,
            });
        }
        Ok(())
    }

    pub fn check_extension(&self, filename: &str) -> Result<(), Rejection> {
        let extension = file_extension(filename).unwrap_or_default();
        if self.allowed_extensions.iter().any(|e| *e == extension) {
            Ok(())
        } else {
            Err(Rejection::UnsupportedFormat { extension })
        }
    }

    /// Check the sniffed type against the allow-list and the declared type.
    ///
    /// The declared type must normalize to the detected one. An empty or
    /// generic declaration is a mismatch like any other.
    pub fn check_content_type(&self, declared: &str, detected: &str) -> Result<(), Rejection> {
        let detected = normalize_content_type(detected);
        if !self.allowed_content_types.contains(&detected) {
            return Err(Rejection::ContentTypeNotAllowed { detected });
        }

        let declared = normalize_content_type(declared);
        if declared != detected {
            return Err(Rejection::ContentTypeMismatch { declared, detected });
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&CoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MB: u64 = 1024 * 1024;

    #[test]
    fn test_size_limits() {
        let policy = UploadPolicy::default();
        assert!(policy.check_size(10 * MB, 10 * MB).is_ok());
        assert_eq!(policy.check_size(0, 0), Err(Rejection::EmptyFile));
        assert_eq!(policy.check_size(10, 0), Err(Rejection::EmptyFile));

        let err = policy.check_size(600 * MB, 16).unwrap_err();
        assert_eq!(
            err,
            Rejection::FileTooLarge {
                size_bytes: 600 * MB,
                max_bytes: 500 * MB
            }
        );
        assert!(err.to_string().starts_with("file too large"));
    }

    #[test]
    fn test_extensions() {
        let policy = UploadPolicy::default();
        assert!(policy.check_extension("clip.mp4").is_ok());
        assert!(policy.check_extension("CLIP.MOV").is_ok());
        assert_eq!(
            policy.check_extension("notes.txt"),
            Err(Rejection::UnsupportedFormat {
                extension: "txt".to_string()
            })
        );
        assert_eq!(policy.check_extension("noext").unwrap_err().code(), "unsupported_format");
    }

    #[test]
    fn test_content_types() {
        let policy = UploadPolicy::default();
        assert!(policy.check_content_type("video/mp4", "video/mp4").is_ok());
        assert!(policy.check_content_type("video/avi", "video/x-msvideo").is_ok());

        assert_eq!(
            policy
                .check_content_type("video/mp4", "application/octet-stream")
                .unwrap_err()
                .code(),
            "content_type_not_allowed"
        );
        assert_eq!(
            policy
                .check_content_type("video/webm", "video/mp4")
                .unwrap_err()
                .code(),
            "content_type_mismatch"
        );
        assert_eq!(
            policy.check_content_type("", "video/webm"),
            Err(Rejection::ContentTypeMismatch {
                declared: String::new(),
                detected: "video/webm".to_string()
            })
        );
        assert_eq!(
            policy
                .check_content_type("application/octet-stream", "video/mp4")
                .unwrap_err()
                .code(),
            "content_type_mismatch"
        );
    }
}
