//! `WebAuthn` assertion response construction
//!
//! Builds the sign-in `AuthenticatorAssertionResponse`. The builder assembles
//! the bytes the credential key must sign (`authenticatorData ||
//! clientDataHash`); signing happens outside and the signature is attached
//! afterwards.

use serde::{Deserialize, Serialize};

use super::authenticator_data::{build_authenticator_data, AuthenticatorFlags};
use super::base64url;
use super::client_data::{CollectedClientData, TYPE_GET};
use super::crypto::CredentialSigner;
use super::errors::WebAuthnError;
use super::types::RequestOptions;

/// Inputs to [`build_assertion_response`]
#[derive(Debug, Clone)]
pub struct AssertionInput<'a> {
    pub options: &'a RequestOptions,
    pub origin: &'a str,
    pub flags: AuthenticatorFlags,
    pub sign_count: u32,
    pub user_handle: &'a [u8],
    pub package_name: Option<&'a str>,
    pub client_data_hash: Option<&'a [u8]>,
}

impl<'a> AssertionInput<'a> {
    #[must_use]
    pub fn new(
        options: &'a RequestOptions,
        origin: &'a str,
        flags: AuthenticatorFlags,
        user_handle: &'a [u8],
    ) -> Self {
        Self {
            options,
            origin,
            flags,
            sign_count: 0,
            user_handle,
            package_name: None,
            client_data_hash: None,
        }
    }

    #[must_use]
    pub fn with_package_name(mut self, package_name: &'a str) -> Self {
        self.package_name = Some(package_name);
        self
    }

    /// Use a hash computed by the platform instead of our own `clientDataJSON`
    #[must_use]
    pub fn with_client_data_hash(mut self, hash: &'a [u8]) -> Self {
        self.client_data_hash = Some(hash);
        self
    }

    #[must_use]
    pub fn with_sign_count(mut self, sign_count: u32) -> Self {
        self.sign_count = sign_count;
        self
    }
}

/// A sign-in response; `signature` stays empty until one is attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResponse {
    pub client_data: CollectedClientData,
    pub client_data_hash: Option<Vec<u8>>,
    pub authenticator_data: Vec<u8>,
    pub signature: Vec<u8>,
    pub user_handle: Vec<u8>,
}

/// JSON form of `AuthenticatorAssertionResponse`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AssertionResponseJson {
    #[serde(rename = "clientDataJSON", skip_serializing_if = "Option::is_none", default)]
    pub client_data_json: Option<String>, // Base64URL-encoded client data JSON
    #[serde(rename = "authenticatorData")]
    pub authenticator_data: String, // Base64URL-encoded authenticator data
    pub signature: String,   // Base64URL-encoded signature
    #[serde(rename = "userHandle")]
    pub user_handle: String, // Base64URL-encoded user handle
}

impl AssertionResponse {
    /// Serialized `clientDataJSON`
    #[must_use]
    pub fn client_data_json(&self) -> Vec<u8> {
        self.client_data.to_bytes()
    }

    /// `authenticatorData || clientDataHash`, the exact buffer to sign.
    /// An externally supplied hash takes precedence over our own client data.
    #[must_use]
    pub fn data_to_sign(&self) -> Vec<u8> {
        let hash = self
            .client_data_hash
            .clone()
            .unwrap_or_else(|| self.client_data.hash().to_vec());
        let mut data = Vec::with_capacity(self.authenticator_data.len() + hash.len());
        data.extend_from_slice(&self.authenticator_data);
        data.extend_from_slice(&hash);
        data
    }

    #[must_use]
    pub fn with_signature(mut self, signature: Vec<u8>) -> Self {
        self.signature = signature;
        self
    }

    /// Sign [`Self::data_to_sign`] with `signer` and attach the signature
    ///
    /// # Errors
    /// Propagates the signer's error.
    pub fn sign_with(self, signer: &dyn CredentialSigner) -> Result<Self, WebAuthnError> {
        let signature = signer.sign(&self.data_to_sign())?;
        Ok(self.with_signature(signature))
    }

    #[must_use]
    pub fn to_json(&self) -> AssertionResponseJson {
        AssertionResponseJson {
            client_data_json: self
                .client_data_hash
                .is_none()
                .then(|| base64url::encode(self.client_data_json())),
            authenticator_data: base64url::encode(&self.authenticator_data),
            signature: base64url::encode(&self.signature),
            user_handle: base64url::encode(&self.user_handle),
        }
    }
}

/// Build an unsigned sign-in response
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` if the authenticator data cannot be built.
pub fn build_assertion_response(
    input: AssertionInput<'_>,
) -> Result<AssertionResponse, WebAuthnError> {
    let client_data = CollectedClientData::new(
        TYPE_GET,
        &input.options.challenge,
        input.origin,
        input.package_name,
    );
    let authenticator_data =
        build_authenticator_data(&input.options.rp_id, input.flags, input.sign_count, None)?;

    log::debug!("Built assertion for rp={}", input.options.rp_id);

    Ok(AssertionResponse {
        client_data,
        client_data_hash: input.client_data_hash.map(<[u8]>::to_vec),
        authenticator_data,
        signature: Vec::new(),
        user_handle: input.user_handle.to_vec(),
    })
}
