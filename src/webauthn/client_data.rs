//! Collected client data
//!
//! The `clientDataJSON` structure binds a ceremony to its type, challenge and
//! origin. Its serialized bytes are hashed into the signed payload, so member
//! order is fixed: type, challenge, origin, androidPackageName.

use serde::{Deserialize, Serialize};

use super::base64url;
use super::crypto::sha256;

pub const TYPE_CREATE: &str = "webauthn.create";
pub const TYPE_GET: &str = "webauthn.get";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub r#type: String,
    pub challenge: String, // Base64URL-encoded challenge
    pub origin: String,
    #[serde(rename = "androidPackageName", skip_serializing_if = "Option::is_none", default)]
    pub android_package_name: Option<String>,
}

impl CollectedClientData {
    #[must_use]
    pub fn new(r#type: &str, challenge: &[u8], origin: &str, package_name: Option<&str>) -> Self {
        Self {
            r#type: r#type.to_string(),
            challenge: base64url::encode(challenge),
            origin: origin.to_string(),
            android_package_name: package_name.map(str::to_string),
        }
    }

    /// Serialized `clientDataJSON` bytes
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        // A struct of plain strings always serializes
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// SHA-256 of the serialized bytes
    #[must_use]
    pub fn hash(&self) -> [u8; 32] {
        sha256(&self.to_bytes())
    }
}
