//! Base64 payload helpers
//!
//! The certificate request carries two independently base64-encoded values
//! that the target expects as a single combined payload. [`concat`] decodes
//! both, concatenates the raw bytes, and re-encodes the result. Decode
//! failures surface as [`Error::InvalidInput`] so callers can reject the
//! request before any routing state is created.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Decode a standard-alphabet base64 string
pub fn decode(value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| Error::invalid_input(format!("Invalid base64 value: {e}")))
}

/// Encode bytes with the standard base64 alphabet
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode two base64 values, concatenate the raw bytes, re-encode
pub fn concat(first: &str, second: &str) -> Result<String> {
    let mut raw = decode(first)?;
    raw.extend(decode(second)?);
    Ok(encode(&raw))
}
