//! Base64URL helpers
//!
//! All binary `WebAuthn` fields travel through JSON as unpadded base64url.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use super::errors::WebAuthnError;

/// URL-safe decoder that accepts input with or without `=` padding
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as unpadded base64url
#[must_use]
pub fn encode(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode base64url, padded or not
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` if the input is not valid base64url.
pub fn decode(input: &str) -> Result<Vec<u8>, WebAuthnError> {
    URL_SAFE_LENIENT
        .decode(input.trim())
        .map_err(|e| WebAuthnError::EncodingError(format!("Invalid base64url: {e}")))
}
