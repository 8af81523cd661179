//! Software authenticator
//!
//! Runs both ceremonies end to end: parse the relying party's options,
//! mint or use a P-256 credential key, build the response and wrap it in a
//! `PublicKeyCredential`. Keys are handed back to the caller; nothing is
//! persisted here.

use super::assertion::{build_assertion_response, AssertionInput};
use super::attestation::{build_attestation_response, AttestationInput};
use super::base64url;
use super::cose::CoseEc2Key;
use super::credential::wrap_credential;
use super::crypto::{new_credential_id, CredentialSigner, SoftwareKey};
use super::errors::WebAuthnError;
use super::options::{parse_creation_options, parse_request_options};
use super::origin::CallerInfo;
use super::settings::WebAuthnSettings;

/// Outcome of a successful registration
#[derive(Debug)]
pub struct Registration {
    /// `PublicKeyCredential` JSON for the relying party
    pub credential_json: String,
    pub credential_id: Vec<u8>,
    /// Private key to keep for later sign-ins
    pub key: SoftwareKey,
    pub user_handle: Vec<u8>,
}

/// Inputs to [`SoftAuthenticator::authenticate`]
pub struct AssertionRequest<'a> {
    pub request_json: &'a str,
    pub caller: &'a CallerInfo,
    pub key: &'a dyn CredentialSigner,
    pub credential_id: &'a [u8],
    pub user_handle: &'a [u8],
    pub sign_count: u32,
    /// Hash computed by the platform; when set, `clientDataJSON` is omitted
    pub client_data_hash: Option<&'a [u8]>,
}

/// Simulated platform authenticator
#[derive(Debug, Clone, Default)]
pub struct SoftAuthenticator {
    settings: WebAuthnSettings,
}

impl SoftAuthenticator {
    /// Create an authenticator with the given settings
    ///
    /// # Errors
    /// Returns `WebAuthnError::ConfigurationError` if the settings are invalid.
    pub fn new(settings: WebAuthnSettings) -> Result<Self, WebAuthnError> {
        settings.validate()?;
        Ok(Self { settings })
    }

    #[must_use]
    pub fn settings(&self) -> &WebAuthnSettings {
        &self.settings
    }

    /// Create a new credential for `PublicKeyCredentialCreationOptions` JSON
    ///
    /// # Errors
    /// Returns an error if the options are malformed or do not accept ES256,
    /// if the new credential is excluded, if the caller origin cannot be
    /// resolved, or if encoding fails.
    pub fn register(
        &self,
        request_json: &str,
        caller: &CallerInfo,
        client_data_hash: Option<&[u8]>,
    ) -> Result<Registration, WebAuthnError> {
        let options = parse_creation_options(request_json)?;
        if !options.accepts_es256() {
            return Err(WebAuthnError::MalformedOptionsError(
                "Relying party does not accept ES256".to_string(),
            ));
        }

        let key = SoftwareKey::generate()?;
        let credential_id = new_credential_id()?;
        if options.excludes(&credential_id) {
            return Err(WebAuthnError::MalformedOptionsError(
                "Credential is in the exclude list".to_string(),
            ));
        }

        let cose_key = CoseEc2Key::from_uncompressed_point(&key.public_key_point())?;
        let cose_bytes = cose_key.encode()?;
        let spki = cose_key.to_spki();
        let origin = caller.resolve_origin()?;

        let mut input = AttestationInput::new(
            &options,
            &credential_id,
            &cose_bytes,
            &origin,
            self.settings.registration_flags,
        )
        .with_spki(&spki)
        .with_aaguid(self.settings.aaguid_bytes()?)
        .with_transports(self.settings.transports.clone());
        if let Some(package_name) = caller.package_name.as_deref() {
            input = input.with_package_name(package_name);
        }
        if let Some(hash) = client_data_hash {
            input = input.with_client_data_hash(hash);
        }

        let response = build_attestation_response(input)?;
        let credential_json = wrap_credential(&credential_id, response, &self.settings.attachment)?;

        log::info!(
            "Registered credential {} for rp={}",
            base64url::encode(&credential_id),
            options.rp.id
        );

        Ok(Registration {
            credential_json,
            credential_id,
            key,
            user_handle: options.user.id,
        })
    }

    /// Sign in with an existing credential for `PublicKeyCredentialRequestOptions` JSON
    ///
    /// # Errors
    /// Returns an error if the options are malformed, the credential is not
    /// in a non-empty allow list, the caller origin cannot be resolved, or
    /// signing fails.
    pub fn authenticate(&self, request: &AssertionRequest<'_>) -> Result<String, WebAuthnError> {
        let options = parse_request_options(request.request_json)?;
        if !options.allows(request.credential_id) {
            return Err(WebAuthnError::MalformedOptionsError(
                "Credential is not in the allow list".to_string(),
            ));
        }

        let origin = request.caller.resolve_origin()?;
        let mut input = AssertionInput::new(
            &options,
            &origin,
            self.settings.assertion_flags,
            request.user_handle,
        )
        .with_sign_count(request.sign_count);
        if let Some(package_name) = request.caller.package_name.as_deref() {
            input = input.with_package_name(package_name);
        }
        if let Some(hash) = request.client_data_hash {
            input = input.with_client_data_hash(hash);
        }

        let response = build_assertion_response(input)?.sign_with(request.key)?;

        log::info!(
            "Signed assertion with credential {} for rp={}",
            base64url::encode(request.credential_id),
            options.rp_id
        );

        wrap_credential(request.credential_id, response, &self.settings.attachment)
    }
}
