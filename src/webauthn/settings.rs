//! `WebAuthn` authenticator settings
//!
//! Behavior the simulated authenticator reports about itself, independent
//! of how the application loads its configuration.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attestation::DEFAULT_TRANSPORTS;
use super::authenticator_data::AuthenticatorFlags;
use super::errors::WebAuthnError;
use super::types::RegistrationPolicy;

/// `WebAuthn` authenticator settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WebAuthnSettings {
    /// Authenticator attachment reported in the credential ("platform", "cross-platform")
    pub attachment: String,
    /// Transports reported in registration responses
    pub transports: Vec<String>,
    /// AAGUID as a UUID string; the nil UUID means no authenticator branding
    pub aaguid: String,
    /// Flags reported during registration
    pub registration_flags: AuthenticatorFlags,
    /// Flags reported during sign-in
    pub assertion_flags: AuthenticatorFlags,
    /// Shape of the registration request sent to the relying party server
    pub registration_policy: RegistrationPolicy,
}

impl Default for WebAuthnSettings {
    fn default() -> Self {
        Self {
            attachment: "platform".to_string(),
            transports: DEFAULT_TRANSPORTS.iter().map(ToString::to_string).collect(),
            aaguid: Uuid::nil().to_string(),
            registration_flags: AuthenticatorFlags::all(),
            assertion_flags: AuthenticatorFlags::all(),
            registration_policy: RegistrationPolicy::default(),
        }
    }
}

impl WebAuthnSettings {
    /// AAGUID bytes
    ///
    /// # Errors
    /// Returns `WebAuthnError::ConfigurationError` if `aaguid` is not a UUID.
    pub fn aaguid_bytes(&self) -> Result<[u8; 16], WebAuthnError> {
        Uuid::parse_str(&self.aaguid)
            .map(Uuid::into_bytes)
            .map_err(|e| {
                WebAuthnError::ConfigurationError(format!("Invalid AAGUID {}: {e}", self.aaguid))
            })
    }

    /// Validate settings
    ///
    /// # Errors
    /// Returns `WebAuthnError::ConfigurationError` if the attachment is not a
    /// `WebAuthn` attachment value or the AAGUID is invalid.
    pub fn validate(&self) -> Result<(), WebAuthnError> {
        if self.attachment != "platform" && self.attachment != "cross-platform" {
            return Err(WebAuthnError::ConfigurationError(format!(
                "Unknown authenticator attachment: {}",
                self.attachment
            )));
        }
        self.aaguid_bytes().map(|_| ())
    }
}
