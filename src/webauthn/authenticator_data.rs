//! Authenticator data construction
//!
//! Layout (W3C `WebAuthn` §6.1):
//! - 32 bytes: RP ID hash
//! - 1 byte: flags
//! - 4 bytes: signature counter (big-endian)
//! - variable: attested credential data (registration only)
//!   - 16 bytes: AAGUID
//!   - 2 bytes: credential ID length (big-endian)
//!   - L bytes: credential ID
//!   - variable: COSE public key

use serde::{Deserialize, Serialize};

use super::crypto::sha256;
use super::errors::WebAuthnError;

pub const FLAG_USER_PRESENT: u8 = 0x01;
pub const FLAG_USER_VERIFIED: u8 = 0x04;
pub const FLAG_BACKUP_ELIGIBLE: u8 = 0x08;
pub const FLAG_BACKUP_STATE: u8 = 0x10;
pub const FLAG_ATTESTED_CREDENTIAL_DATA: u8 = 0x40;

/// Fixed-size prefix: rpIdHash, flags, signCount
pub const AUTH_DATA_MIN_LEN: usize = 37;

/// Caller-controlled authenticator data flags
///
/// When deserialized, flags that are not named stay set, as in [`AuthenticatorFlags::all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default = "AuthenticatorFlags::all")]
#[allow(clippy::struct_excessive_bools)]
pub struct AuthenticatorFlags {
    pub user_present: bool,
    pub user_verified: bool,
    pub backup_eligible: bool,
    pub backup_state: bool,
}

impl AuthenticatorFlags {
    /// UP, UV, BE and BS all set; what a synced platform passkey reports
    #[must_use]
    pub fn all() -> Self {
        Self {
            user_present: true,
            user_verified: true,
            backup_eligible: true,
            backup_state: true,
        }
    }

    /// Flag byte for these flags, without the AT bit
    #[must_use]
    pub fn bits(self) -> u8 {
        let mut flags = 0;
        if self.user_present {
            flags |= FLAG_USER_PRESENT;
        }
        if self.user_verified {
            flags |= FLAG_USER_VERIFIED;
        }
        if self.backup_eligible {
            flags |= FLAG_BACKUP_ELIGIBLE;
        }
        if self.backup_state {
            flags |= FLAG_BACKUP_STATE;
        }
        flags
    }
}

/// Attested credential data appended during registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData {
    pub aaguid: [u8; 16],
    pub credential_id: Vec<u8>,
    pub public_key_cose: Vec<u8>,
}

/// Build the authenticator data byte string
///
/// The AT flag is set exactly when `attested` is present.
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` if the credential id is longer
/// than 65535 bytes.
pub fn build_authenticator_data(
    rp_id: &str,
    flags: AuthenticatorFlags,
    sign_count: u32,
    attested: Option<&AttestedCredentialData>,
) -> Result<Vec<u8>, WebAuthnError> {
    let mut flag_byte = flags.bits();
    if attested.is_some() {
        flag_byte |= FLAG_ATTESTED_CREDENTIAL_DATA;
    }

    let mut data = Vec::with_capacity(AUTH_DATA_MIN_LEN);
    data.extend_from_slice(&sha256(rp_id.as_bytes()));
    data.push(flag_byte);
    data.extend_from_slice(&sign_count.to_be_bytes());

    if let Some(cred) = attested {
        let id_len = u16::try_from(cred.credential_id.len()).map_err(|_| {
            WebAuthnError::EncodingError(format!(
                "Credential id too long: {} bytes",
                cred.credential_id.len()
            ))
        })?;
        data.extend_from_slice(&cred.aaguid);
        data.extend_from_slice(&id_len.to_be_bytes());
        data.extend_from_slice(&cred.credential_id);
        data.extend_from_slice(&cred.public_key_cose);
    }

    Ok(data)
}
