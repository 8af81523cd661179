//! `WebAuthn` attestation response construction
//!
//! Builds the registration-side `AuthenticatorAttestationResponse`: the
//! client data, authenticator data with attested credential data, and a
//! `"none"` format attestation object.

use serde::{Deserialize, Serialize};

use super::authenticator_data::{
    build_authenticator_data, AttestedCredentialData, AuthenticatorFlags,
};
use super::base64url;
use super::cbor::{self, CborValue};
use super::client_data::{CollectedClientData, TYPE_CREATE};
use super::errors::WebAuthnError;
use super::types::{CreationOptions, COSE_ALG_ES256};

/// Attestation statement format; no signature, no certificate chain
pub const ATTESTATION_FORMAT_NONE: &str = "none";

/// Transports reported for a platform credential that can also be used via hybrid
pub const DEFAULT_TRANSPORTS: [&str; 2] = ["internal", "hybrid"];

/// Inputs to [`build_attestation_response`]
#[derive(Debug, Clone)]
pub struct AttestationInput<'a> {
    pub options: &'a CreationOptions,
    pub credential_id: &'a [u8],
    pub credential_public_key: &'a [u8], // COSE_Key bytes
    pub spki: Option<&'a [u8]>,
    pub origin: &'a str,
    pub flags: AuthenticatorFlags,
    pub sign_count: u32,
    pub aaguid: [u8; 16],
    pub package_name: Option<&'a str>,
    pub client_data_hash: Option<&'a [u8]>,
    pub transports: Vec<String>,
}

impl<'a> AttestationInput<'a> {
    /// Inputs with a zero AAGUID, zero sign count, no SPKI, no package name
    /// and the default transports
    #[must_use]
    pub fn new(
        options: &'a CreationOptions,
        credential_id: &'a [u8],
        credential_public_key: &'a [u8],
        origin: &'a str,
        flags: AuthenticatorFlags,
    ) -> Self {
        Self {
            options,
            credential_id,
            credential_public_key,
            spki: None,
            origin,
            flags,
            sign_count: 0,
            aaguid: [0; 16],
            package_name: None,
            client_data_hash: None,
            transports: DEFAULT_TRANSPORTS.iter().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn with_spki(mut self, spki: &'a [u8]) -> Self {
        self.spki = Some(spki);
        self
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
    pub fn with_aaguid(mut self, aaguid: [u8; 16]) -> Self {
        self.aaguid = aaguid;
        self
    }

    #[must_use]
    pub fn with_sign_count(mut self, sign_count: u32) -> Self {
        self.sign_count = sign_count;
        self
    }

    #[must_use]
    pub fn with_transports(mut self, transports: Vec<String>) -> Self {
        self.transports = transports;
        self
    }
}

/// A finished registration response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationResponse {
    pub client_data: CollectedClientData,
    pub client_data_hash: Option<Vec<u8>>,
    pub authenticator_data: Vec<u8>,
    pub attestation_object: Vec<u8>,
    pub transports: Vec<String>,
    pub public_key_algorithm: i64,
    pub public_key: Option<Vec<u8>>, // DER SubjectPublicKeyInfo
}

/// JSON form of `AuthenticatorAttestationResponse`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AttestationResponseJson {
    #[serde(rename = "clientDataJSON", skip_serializing_if = "Option::is_none", default)]
    pub client_data_json: Option<String>, // Base64URL-encoded client data JSON
    #[serde(rename = "attestationObject")]
    pub attestation_object: String, // Base64URL-encoded attestation object
    pub transports: Vec<String>,
    #[serde(rename = "authenticatorData")]
    pub authenticator_data: String, // Base64URL-encoded authenticator data
    #[serde(rename = "publicKeyAlgorithm")]
    pub public_key_algorithm: i64,
    #[serde(rename = "publicKey", skip_serializing_if = "Option::is_none", default)]
    pub public_key: Option<String>, // Base64URL-encoded SPKI
}

impl AttestationResponse {
    /// Serialized `clientDataJSON`
    #[must_use]
    pub fn client_data_json(&self) -> Vec<u8> {
        self.client_data.to_bytes()
    }

    /// True when no SPKI was supplied and `publicKey` is left out of the JSON
    #[must_use]
    pub fn public_key_missing(&self) -> bool {
        self.public_key.is_none()
    }

    #[must_use]
    pub fn to_json(&self) -> AttestationResponseJson {
        AttestationResponseJson {
            client_data_json: self
                .client_data_hash
                .is_none()
                .then(|| base64url::encode(self.client_data_json())),
            attestation_object: base64url::encode(&self.attestation_object),
            transports: self.transports.clone(),
            authenticator_data: base64url::encode(&self.authenticator_data),
            public_key_algorithm: self.public_key_algorithm,
            public_key: self.public_key.as_ref().map(base64url::encode),
        }
    }
}

/// Encode a `"none"` attestation object around `auth_data`
///
/// # Errors
/// Propagates CBOR encoding errors.
pub fn attestation_object(auth_data: &[u8]) -> Result<Vec<u8>, WebAuthnError> {
    cbor::encode(&CborValue::map([
        (CborValue::from("fmt"), CborValue::from(ATTESTATION_FORMAT_NONE)),
        (CborValue::from("attStmt"), CborValue::empty_map()),
        (CborValue::from("authData"), CborValue::from(auth_data)),
    ]))
}

/// Build a registration response
///
/// A missing SPKI is not fatal: the response omits `publicKey` and a warning
/// is logged.
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` if the authenticator data or
/// attestation object cannot be encoded.
pub fn build_attestation_response(
    input: AttestationInput<'_>,
) -> Result<AttestationResponse, WebAuthnError> {
    let client_data = CollectedClientData::new(
        TYPE_CREATE,
        &input.options.challenge,
        input.origin,
        input.package_name,
    );

    let attested = AttestedCredentialData {
        aaguid: input.aaguid,
        credential_id: input.credential_id.to_vec(),
        public_key_cose: input.credential_public_key.to_vec(),
    };
    let authenticator_data = build_authenticator_data(
        &input.options.rp.id,
        input.flags,
        input.sign_count,
        Some(&attested),
    )?;
    let attestation_object = attestation_object(&authenticator_data)?;

    if input.spki.is_none() {
        log::warn!(
            "Public key is missing; registration response for rp={} will omit publicKey",
            input.options.rp.id
        );
    }

    log::debug!(
        "Built attestation for rp={} credential_id={}",
        input.options.rp.id,
        base64url::encode(input.credential_id)
    );

    Ok(AttestationResponse {
        client_data,
        client_data_hash: input.client_data_hash.map(<[u8]>::to_vec),
        authenticator_data,
        attestation_object,
        transports: input.transports,
        public_key_algorithm: COSE_ALG_ES256,
        public_key: input.spki.map(<[u8]>::to_vec),
    })
}
