//! HMAC-signed download tokens.
//!
//! Backends without native presigning embed a signed token in the download
//! URL. The token names the object key and an expiry; whoever serves the
//! bytes verifies the signature before streaming.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{StorageError, StorageResult};

type HmacSha256 = Hmac<Sha256>;

/// Token payload for a signed download URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadToken {
    /// Object key.
    pub key: String,
    /// Expiry timestamp (Unix seconds).
    pub exp: u64,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl DownloadToken {
    /// Create a token for `key` valid for `expires_in_minutes`.
    pub fn new(key: &str, expires_in_minutes: u32) -> Self {
        Self {
            key: key.to_string(),
            exp: unix_now() + u64::from(expires_in_minutes) * 60,
        }
    }

    pub fn is_expired(&self) -> bool {
        unix_now() >= self.exp
    }

    /// Sign the token, producing `payload.signature`.
    pub fn sign(&self, secret: &str) -> StorageResult<String> {
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(self)?);
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| StorageError::config_error(format!("Invalid HMAC key: {}", e)))?;
        mac.update(payload.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", payload, URL_SAFE_NO_PAD.encode(signature)))
    }

    /// Verify a signed token.
    ///
    /// Returns `None` if the token is malformed, expired, or the signature
    /// does not match.
    pub fn verify(signed: &str, secret: &str) -> StorageResult<Option<Self>> {
        let Some((payload, sig_encoded)) = signed.split_once('.') else {
            return Ok(None);
        };
        let Ok(sig_bytes) = URL_SAFE_NO_PAD.decode(sig_encoded) else {
            return Ok(None);
        };

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| StorageError::config_error(format!("Invalid HMAC key: {}", e)))?;
        mac.update(payload.as_bytes());
        if mac.verify_slice(&sig_bytes).is_err() {
            return Ok(None);
        }

        let token: Option<Self> = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok());

        Ok(token.filter(|t| !t.is_expired()))
    }
}
