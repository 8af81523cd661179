//! `WebAuthn` core types
//!
//! Typed, decoded forms of the relying party's ceremony options. Binary
//! fields (challenge, user handle, credential ids) are held as raw bytes;
//! they are base64url only on the wire.

use serde::{Deserialize, Serialize};

/// COSE algorithm identifier for ES256 (ECDSA P-256 with SHA-256)
pub const COSE_ALG_ES256: i64 = -7;

/// The only credential type `WebAuthn` defines
pub const PUBLIC_KEY_CREDENTIAL_TYPE: &str = "public-key";

/// `WebAuthn` relying party information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelyingParty {
    pub id: String,   // Domain name (e.g., "example.com")
    pub name: String, // Display name
}

/// `WebAuthn` user entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    pub id: Vec<u8>,          // Opaque user handle
    pub name: String,         // Username (e.g., email)
    pub display_name: String, // Display name
}

/// Public key credential parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredentialParameters {
    pub r#type: String, // Always "public-key"
    pub alg: i64,       // COSE algorithm identifier (-7 for ES256)
}

/// Public key credential descriptor, used by exclude and allow lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyCredentialDescriptor {
    pub id: Vec<u8>,
    pub r#type: String,
    pub transports: Vec<String>,
}

/// Authenticator selection criteria as sent by the relying party
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorSelectionCriteria {
    pub authenticator_attachment: Option<String>, // "platform", "cross-platform"
    pub resident_key: Option<String>,             // "required", "preferred", "discouraged"
    pub require_resident_key: bool,
    pub user_verification: String, // "required", "preferred", "discouraged"
}

impl Default for AuthenticatorSelectionCriteria {
    fn default() -> Self {
        Self {
            authenticator_attachment: None,
            resident_key: None,
            require_resident_key: false,
            user_verification: "preferred".to_string(),
        }
    }
}

/// Decoded `PublicKeyCredentialCreationOptions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationOptions {
    pub rp: RelyingParty,
    pub user: UserEntity,
    pub challenge: Vec<u8>,
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,
    pub timeout: u64, // Milliseconds, 0 when absent
    pub exclude_credentials: Vec<PublicKeyCredentialDescriptor>,
    pub authenticator_selection: AuthenticatorSelectionCriteria,
    pub attestation: String, // "none", "indirect", "direct"
}

impl CreationOptions {
    /// Whether the relying party accepts ES256 credentials.
    /// An empty parameter list means the relying party left the choice open.
    #[must_use]
    pub fn accepts_es256(&self) -> bool {
        self.pub_key_cred_params.is_empty()
            || self
                .pub_key_cred_params
                .iter()
                .any(|p| p.alg == COSE_ALG_ES256 && p.r#type == PUBLIC_KEY_CREDENTIAL_TYPE)
    }

    /// Whether `credential_id` appears in `excludeCredentials`
    #[must_use]
    pub fn excludes(&self, credential_id: &[u8]) -> bool {
        self.exclude_credentials
            .iter()
            .any(|c| c.id == credential_id)
    }
}

/// Decoded `PublicKeyCredentialRequestOptions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub challenge: Vec<u8>,
    pub rp_id: String,
    pub timeout: u64, // Milliseconds, 0 when absent
    pub user_verification: String,
    pub allow_credentials: Vec<PublicKeyCredentialDescriptor>,
}

impl RequestOptions {
    /// Whether `credential_id` may answer this request. An empty allow list
    /// means any discoverable credential for the RP may answer.
    #[must_use]
    pub fn allows(&self, credential_id: &[u8]) -> bool {
        self.allow_credentials.is_empty()
            || self
                .allow_credentials
                .iter()
                .any(|c| c.id == credential_id)
    }
}

/// Shape of the registration request the client sends to the relying party
/// server before it receives creation options.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RegistrationPolicy {
    pub attestation: String,
    #[serde(rename = "authenticatorSelection")]
    pub authenticator_selection: RegistrationSelection,
}

/// `authenticatorSelection` of the outbound registration request
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RegistrationSelection {
    #[serde(rename = "authenticatorAttachment")]
    pub authenticator_attachment: String,
    #[serde(rename = "userVerification")]
    pub user_verification: String,
    #[serde(rename = "requireResidentKey")]
    pub require_resident_key: bool,
    #[serde(rename = "residentKey")]
    pub resident_key: String,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        Self {
            attestation: "none".to_string(),
            authenticator_selection: RegistrationSelection::default(),
        }
    }
}

impl Default for RegistrationSelection {
    fn default() -> Self {
        Self {
            authenticator_attachment: "platform".to_string(),
            user_verification: "required".to_string(),
            require_resident_key: true,
            resident_key: "required".to_string(),
        }
    }
}

impl RegistrationPolicy {
    /// Serialize to the JSON body of the registration request
    ///
    /// # Errors
    /// Returns an error if JSON serialization fails.
    pub fn to_request_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
