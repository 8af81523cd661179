//! Public key credential envelope
//!
//! Wraps an authenticator response into the top-level `PublicKeyCredential`
//! JSON handed back to the relying party.

use serde::{Deserialize, Serialize};

use super::assertion::{AssertionResponse, AssertionResponseJson};
use super::attestation::{AttestationResponse, AttestationResponseJson};
use super::base64url;
use super::client_data::CollectedClientData;
use super::errors::WebAuthnError;
use super::types::PUBLIC_KEY_CREDENTIAL_TYPE;

/// Response of either ceremony
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticatorResponse {
    Attestation(AttestationResponse),
    Assertion(AssertionResponse),
}

/// JSON form of either response
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum AuthenticatorResponseJson {
    Attestation(AttestationResponseJson),
    Assertion(AssertionResponseJson),
}

impl AuthenticatorResponse {
    #[must_use]
    pub fn client_data(&self) -> &CollectedClientData {
        match self {
            AuthenticatorResponse::Attestation(r) => &r.client_data,
            AuthenticatorResponse::Assertion(r) => &r.client_data,
        }
    }

    /// Serialized `clientDataJSON`
    #[must_use]
    pub fn client_data_json(&self) -> Vec<u8> {
        self.client_data().to_bytes()
    }

    #[must_use]
    pub fn to_json(&self) -> AuthenticatorResponseJson {
        match self {
            AuthenticatorResponse::Attestation(r) => {
                AuthenticatorResponseJson::Attestation(r.to_json())
            }
            AuthenticatorResponse::Assertion(r) => {
                AuthenticatorResponseJson::Assertion(r.to_json())
            }
        }
    }
}

impl From<AttestationResponse> for AuthenticatorResponse {
    fn from(response: AttestationResponse) -> Self {
        AuthenticatorResponse::Attestation(response)
    }
}

impl From<AssertionResponse> for AuthenticatorResponse {
    fn from(response: AssertionResponse) -> Self {
        AuthenticatorResponse::Assertion(response)
    }
}

/// `{ "credProps": { "rk": true } }`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ClientExtensionResults {
    #[serde(rename = "credProps")]
    pub cred_props: CredentialProperties,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CredentialProperties {
    pub rk: bool,
}

impl Default for ClientExtensionResults {
    fn default() -> Self {
        Self {
            cred_props: CredentialProperties { rk: true },
        }
    }
}

/// JSON form of `PublicKeyCredential`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyCredentialJson {
    pub id: String,     // Base64URL-encoded credential ID
    #[serde(rename = "rawId")]
    pub raw_id: String, // Same value as `id`
    #[serde(rename = "type")]
    pub r#type: String, // Always "public-key"
    #[serde(rename = "authenticatorAttachment")]
    pub authenticator_attachment: String,
    pub response: AuthenticatorResponseJson,
    #[serde(rename = "clientExtensionResults")]
    pub client_extension_results: ClientExtensionResults,
}

/// A credential ready to be returned to the relying party
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredential {
    pub raw_id: Vec<u8>,
    pub response: AuthenticatorResponse,
    pub authenticator_attachment: String,
}

impl PublicKeyCredential {
    #[must_use]
    pub fn new(
        raw_id: Vec<u8>,
        response: impl Into<AuthenticatorResponse>,
        authenticator_attachment: &str,
    ) -> Self {
        Self {
            raw_id,
            response: response.into(),
            authenticator_attachment: authenticator_attachment.to_string(),
        }
    }

    #[must_use]
    pub fn to_json_value(&self) -> PublicKeyCredentialJson {
        let id = base64url::encode(&self.raw_id);
        PublicKeyCredentialJson {
            raw_id: id.clone(),
            id,
            r#type: PUBLIC_KEY_CREDENTIAL_TYPE.to_string(),
            authenticator_attachment: self.authenticator_attachment.clone(),
            response: self.response.to_json(),
            client_extension_results: ClientExtensionResults::default(),
        }
    }

    /// Serialize the credential to a JSON string
    ///
    /// # Errors
    /// Returns `WebAuthnError::EncodingError` if serialization fails.
    pub fn to_json(&self) -> Result<String, WebAuthnError> {
        serde_json::to_string(&self.to_json_value()).map_err(|e| {
            WebAuthnError::EncodingError(format!("Credential serialization failed: {e}"))
        })
    }
}

/// Wrap `response` into a `PublicKeyCredential` JSON string
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` if serialization fails.
pub fn wrap_credential(
    raw_id: &[u8],
    response: impl Into<AuthenticatorResponse>,
    authenticator_attachment: &str,
) -> Result<String, WebAuthnError> {
    PublicKeyCredential::new(raw_id.to_vec(), response, authenticator_attachment).to_json()
}
