//! Transport encoding for secret keys.
//!
//! Secrets cross the HTTP boundary as standard (padded) base64. Decoded bytes
//! go straight into a [`ZeroizingBytes`] so the plaintext key never sits in
//! an ordinary `Vec`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::CryptoError;
use crate::zeroizing::{ZeroizingBytes, ZeroizingString};

/// Decode a base64 secret. Surrounding whitespace is ignored.
pub fn decode_secret(encoded: &str) -> Result<ZeroizingBytes, CryptoError> {
    let trimmed = encoded.trim();
    if trimmed.is_empty() {
        return Err(CryptoError::InvalidInput("secret is empty".into()));
    }

    let bytes = STANDARD
        .decode(trimmed)
        .map_err(|e| CryptoError::InvalidEncoding(e.to_string()))?;

    Ok(ZeroizingBytes::new(bytes))
}

/// Encode secret bytes as base64.
pub fn encode_secret(secret: &[u8]) -> ZeroizingString {
    ZeroizingString::new(STANDARD.encode(secret))
}
