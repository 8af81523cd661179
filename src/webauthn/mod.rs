//! `WebAuthn` authenticator implementation
//!
//! This module builds the authenticator side of the W3C `WebAuthn` ceremonies:
//! authenticator data, `"none"` attestation objects, assertion payloads and
//! the `PublicKeyCredential` JSON envelope. It has no network or storage
//! dependencies; keys live in memory and are handed back to the caller.

mod assertion;
mod attestation;
mod authenticator_data;
pub mod base64url;
pub mod cbor;
mod client_data;
mod cose;
mod credential;
mod crypto;
mod errors;
#[cfg(feature = "inspect")]
pub mod inspect;
mod options;
mod origin;
mod service;
mod settings;
mod types;

// Re-exports for public use
pub use assertion::{
    build_assertion_response, AssertionInput, AssertionResponse, AssertionResponseJson,
};
pub use attestation::{
    attestation_object, build_attestation_response, AttestationInput, AttestationResponse,
    AttestationResponseJson, ATTESTATION_FORMAT_NONE, DEFAULT_TRANSPORTS,
};
pub use authenticator_data::{
    build_authenticator_data, AttestedCredentialData, AuthenticatorFlags, AUTH_DATA_MIN_LEN,
    FLAG_ATTESTED_CREDENTIAL_DATA, FLAG_BACKUP_ELIGIBLE, FLAG_BACKUP_STATE, FLAG_USER_PRESENT,
    FLAG_USER_VERIFIED,
};
pub use cbor::CborValue;
pub use client_data::{CollectedClientData, TYPE_CREATE, TYPE_GET};
pub use cose::CoseEc2Key;
pub use credential::{
    wrap_credential, AuthenticatorResponse, AuthenticatorResponseJson, ClientExtensionResults,
    CredentialProperties, PublicKeyCredential, PublicKeyCredentialJson,
};
pub use crypto::{new_credential_id, sha256, CredentialSigner, SoftwareKey, CREDENTIAL_ID_LEN};
pub use errors::WebAuthnError;
pub use options::{parse_creation_options, parse_request_options};
pub use origin::{
    app_origin, certificate_fingerprint, AssetLinkVerifier, CallerInfo, SigningInfo,
    StaticAssetLinks, APK_KEY_HASH_PREFIX,
};
pub use service::{AssertionRequest, Registration, SoftAuthenticator};
pub use settings::WebAuthnSettings;
pub use types::*;
