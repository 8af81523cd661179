//! `WebAuthn` error types
//!
//! This module defines the error type shared by every authenticator operation.

use std::fmt;

/// Errors that can occur while building authenticator responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebAuthnError {
    /// Invalid input to an encoder (unsupported CBOR value, oversized argument)
    EncodingError(String),

    /// A required field of the relying party's options is missing or invalid
    MalformedOptionsError(String),

    /// The caller's origin could not be established (no signer, multiple signers)
    OriginError(String),

    /// Key generation or signing failed
    SigningError(String),

    /// Configuration error (e.g., invalid settings)
    ConfigurationError(String),
}

impl fmt::Display for WebAuthnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebAuthnError::EncodingError(msg) => write!(f, "Encoding error: {msg}"),
            WebAuthnError::MalformedOptionsError(msg) => write!(f, "Malformed options: {msg}"),
            WebAuthnError::OriginError(msg) => write!(f, "Origin error: {msg}"),
            WebAuthnError::SigningError(msg) => write!(f, "Signing error: {msg}"),
            WebAuthnError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for WebAuthnError {}
