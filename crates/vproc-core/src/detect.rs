//! Content sniffing.
//!
//! The declared content type of an upload is client-controlled, so the
//! submit flow compares it with the type recognized from the file's leading
//! bytes.

/// Returned when no known signature matches.
pub const UNKNOWN_CONTENT_TYPE: &str = "application/octet-stream";

/// Number of leading bytes scanned for the EBML doctype.
const EBML_SCAN_LEN: usize = 64;

/// Recognizes the real content type of uploaded bytes.
pub trait ContentTypeDetector: Send + Sync {
    /// Detect the content type of `data`. `filename` and `declared_type` are
    /// hints only; implementations must not simply echo them back.
    fn detect(&self, data: &[u8], filename: &str, declared_type: &str) -> String;
}

/// Detector based on container magic bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicByteDetector;

impl MagicByteDetector {
    pub fn new() -> Self {
        Self
    }
}

impl ContentTypeDetector for MagicByteDetector {
    fn detect(&self, data: &[u8], _filename: &str, _declared_type: &str) -> String {
        sniff(data).unwrap_or(UNKNOWN_CONTENT_TYPE).to_string()
    }
}

fn sniff(data: &[u8]) -> Option<&'static str> {
    // ISO BMFF: [size:4]["ftyp"][major brand:4]
    if data.len() >= 12 && &data[4..8] == b"ftyp" {
        return Some(match &data[8..12] {
            b"qt  " => "video/quicktime",
            _ => "video/mp4",
        });
    }

    if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"AVI " {
        return Some("video/x-msvideo");
    }

    if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        let head = &data[..data.len().min(EBML_SCAN_LEN)];
        let is_webm = head.windows(4).any(|w| w == b"webm");
        return Some(if is_webm { "video/webm" } else { "video/x-matroska" });
    }

    None
}

/// Normalize a declared content type for comparison.
///
/// Lowercases, drops parameters (`; codecs=...`) and maps common aliases to
/// the canonical type the detector reports.
pub fn normalize_content_type(content_type: &str) -> String {
    let base = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    let canonical = match base.as_str() {
        "video/avi" | "video/msvideo" | "video/vnd.avi" => "video/x-msvideo",
        "video/mov" => "video/quicktime",
        "video/mkv" => "video/x-matroska",
        "video/x-m4v" | "application/mp4" => "video/mp4",
        _ => return base,
    };
    canonical.to_string()
}
