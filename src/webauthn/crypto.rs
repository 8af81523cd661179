//! `WebAuthn` cryptography operations
//!
//! Hashing for authenticator data and client data, plus a software ES256 key
//! that stands in for the platform keystore. The response builders never sign
//! anything themselves; callers hand a [`CredentialSigner`] the bytes from
//! `data_to_sign` and embed the returned signature.

use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};

use super::errors::WebAuthnError;

/// Length of credential ids minted by this authenticator
pub const CREDENTIAL_ID_LEN: usize = 32;

/// Hash data using SHA-256
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(digest::digest(&digest::SHA256, data).as_ref());
    out
}

/// Generate a fresh random credential id
///
/// # Errors
/// Returns `WebAuthnError::SigningError` if the system RNG fails.
pub fn new_credential_id() -> Result<Vec<u8>, WebAuthnError> {
    let mut bytes = vec![0u8; CREDENTIAL_ID_LEN];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| WebAuthnError::SigningError("Failed to generate credential id".to_string()))?;
    Ok(bytes)
}

/// Holder of a credential private key
pub trait CredentialSigner {
    /// Public key as an uncompressed SEC1 point (`0x04 || x || y`)
    fn public_key_point(&self) -> Vec<u8>;

    /// Sign `data` with the credential key, returning an ASN.1 DER signature
    ///
    /// # Errors
    /// Returns `WebAuthnError::SigningError` if signing fails.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, WebAuthnError>;
}

/// ECDSA P-256 key held in memory
pub struct SoftwareKey {
    key_pair: EcdsaKeyPair,
    pkcs8: Vec<u8>,
    rng: SystemRandom,
}

impl SoftwareKey {
    /// Generate a new P-256 key
    ///
    /// # Errors
    /// Returns `WebAuthnError::SigningError` if key generation fails.
    pub fn generate() -> Result<Self, WebAuthnError> {
        let rng = SystemRandom::new();
        let document = EcdsaKeyPair::generate_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, &rng)
            .map_err(|_| WebAuthnError::SigningError("Failed to generate P-256 key".to_string()))?;
        Self::from_pkcs8(document.as_ref())
    }

    /// Load a key previously exported with [`SoftwareKey::pkcs8`]
    ///
    /// # Errors
    /// Returns `WebAuthnError::SigningError` if the document is not a P-256 PKCS#8 key.
    pub fn from_pkcs8(pkcs8: &[u8]) -> Result<Self, WebAuthnError> {
        let rng = SystemRandom::new();
        let key_pair = EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, pkcs8, &rng)
            .map_err(|e| WebAuthnError::SigningError(format!("Rejected PKCS#8 key: {e}")))?;
        Ok(Self {
            key_pair,
            pkcs8: pkcs8.to_vec(),
            rng,
        })
    }

    /// PKCS#8 document for the external credential store
    #[must_use]
    pub fn pkcs8(&self) -> &[u8] {
        &self.pkcs8
    }
}

impl CredentialSigner for SoftwareKey {
    fn public_key_point(&self) -> Vec<u8> {
        self.key_pair.public_key().as_ref().to_vec()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, WebAuthnError> {
        self.key_pair
            .sign(&self.rng, data)
            .map(|sig| sig.as_ref().to_vec())
            .map_err(|_| WebAuthnError::SigningError("ECDSA signing failed".to_string()))
    }
}

impl std::fmt::Debug for SoftwareKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareKey")
            .field("public_key", &self.public_key_point())
            .finish_non_exhaustive()
    }
}
