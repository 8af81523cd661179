//! Relying party option parsing
//!
//! Parses the server-issued `PublicKeyCredentialCreationOptions` and
//! `PublicKeyCredentialRequestOptions` JSON into the typed structures in
//! [`super::types`]. Unknown members are ignored; missing required members
//! fail immediately with `MalformedOptionsError`.

use serde::Deserialize;

use super::base64url;
use super::errors::WebAuthnError;
use super::types::{
    AuthenticatorSelectionCriteria, CreationOptions, PublicKeyCredentialDescriptor,
    PublicKeyCredentialParameters, RelyingParty, RequestOptions, UserEntity,
    PUBLIC_KEY_CREDENTIAL_TYPE,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreationOptionsJson {
    rp: RelyingPartyJson,
    user: UserJson,
    challenge: String,
    #[serde(default)]
    pub_key_cred_params: Vec<CredentialParameterJson>,
    #[serde(default)]
    timeout: Option<f64>,
    #[serde(default)]
    exclude_credentials: Vec<DescriptorJson>,
    #[serde(default)]
    authenticator_selection: Option<SelectionJson>,
    #[serde(default)]
    attestation: Option<String>,
}

#[derive(Deserialize)]
struct RelyingPartyJson {
    id: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserJson {
    id: String,
    name: String,
    display_name: String,
}

#[derive(Deserialize)]
struct CredentialParameterJson {
    #[serde(rename = "type")]
    r#type: String,
    alg: i64,
}

#[derive(Deserialize)]
struct DescriptorJson {
    id: String,
    #[serde(rename = "type", default)]
    r#type: Option<String>,
    #[serde(default)]
    transports: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionJson {
    #[serde(default)]
    authenticator_attachment: Option<String>,
    #[serde(default)]
    resident_key: Option<String>,
    #[serde(default)]
    require_resident_key: bool,
    #[serde(default)]
    user_verification: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestOptionsJson {
    challenge: String,
    rp_id: String,
    #[serde(default)]
    timeout: Option<f64>,
    #[serde(default)]
    user_verification: Option<String>,
    #[serde(default)]
    allow_credentials: Vec<DescriptorJson>,
}

/// Parse creation options from the relying party's JSON
///
/// # Errors
/// Returns `WebAuthnError::MalformedOptionsError` if the JSON is invalid, a
/// required member (`rp`, `user`, `challenge`) is missing, or a base64url
/// member cannot be decoded.
pub fn parse_creation_options(json: &str) -> Result<CreationOptions, WebAuthnError> {
    let raw: CreationOptionsJson = serde_json::from_str(json).map_err(|e| {
        WebAuthnError::MalformedOptionsError(format!("Invalid creation options: {e}"))
    })?;

    let challenge = decode_member("challenge", &raw.challenge)?;
    let user_id = decode_member("user.id", &raw.user.id)?;
    let exclude_credentials = decode_descriptors("excludeCredentials", raw.exclude_credentials)?;

    let authenticator_selection = raw
        .authenticator_selection
        .map(|s| AuthenticatorSelectionCriteria {
            authenticator_attachment: s.authenticator_attachment,
            resident_key: s.resident_key,
            require_resident_key: s.require_resident_key,
            user_verification: s
                .user_verification
                .unwrap_or_else(|| "preferred".to_string()),
        })
        .unwrap_or_default();

    let options = CreationOptions {
        rp: RelyingParty {
            id: raw.rp.id,
            name: raw.rp.name,
        },
        user: UserEntity {
            id: user_id,
            name: raw.user.name,
            display_name: raw.user.display_name,
        },
        challenge,
        pub_key_cred_params: raw
            .pub_key_cred_params
            .into_iter()
            .map(|p| PublicKeyCredentialParameters {
                r#type: p.r#type,
                alg: p.alg,
            })
            .collect(),
        timeout: timeout_millis(raw.timeout),
        exclude_credentials,
        authenticator_selection,
        attestation: raw.attestation.unwrap_or_else(|| "none".to_string()),
    };

    log::debug!(
        "Parsed creation options for rp={} user={}",
        options.rp.id,
        options.user.name
    );
    Ok(options)
}

/// Parse request options from the relying party's JSON
///
/// # Errors
/// Returns `WebAuthnError::MalformedOptionsError` if the JSON is invalid,
/// `challenge` or `rpId` is missing, or a base64url member cannot be decoded.
pub fn parse_request_options(json: &str) -> Result<RequestOptions, WebAuthnError> {
    let raw: RequestOptionsJson = serde_json::from_str(json).map_err(|e| {
        WebAuthnError::MalformedOptionsError(format!("Invalid request options: {e}"))
    })?;

    let options = RequestOptions {
        challenge: decode_member("challenge", &raw.challenge)?,
        rp_id: raw.rp_id,
        timeout: timeout_millis(raw.timeout),
        user_verification: raw
            .user_verification
            .unwrap_or_else(|| "preferred".to_string()),
        allow_credentials: decode_descriptors("allowCredentials", raw.allow_credentials)?,
    };

    log::debug!("Parsed request options for rp={}", options.rp_id);
    Ok(options)
}

fn decode_member(name: &str, value: &str) -> Result<Vec<u8>, WebAuthnError> {
    base64url::decode(value)
        .map_err(|e| WebAuthnError::MalformedOptionsError(format!("{name}: {e}")))
}

fn decode_descriptors(
    name: &str,
    descriptors: Vec<DescriptorJson>,
) -> Result<Vec<PublicKeyCredentialDescriptor>, WebAuthnError> {
    descriptors
        .into_iter()
        .map(|d| {
            Ok(PublicKeyCredentialDescriptor {
                id: decode_member(name, &d.id)?,
                r#type: d
                    .r#type
                    .unwrap_or_else(|| PUBLIC_KEY_CREDENTIAL_TYPE.to_string()),
                transports: d.transports,
            })
        })
        .collect()
}

// Servers emit timeouts as plain JSON numbers, sometimes with a fraction
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn timeout_millis(timeout: Option<f64>) -> u64 {
    match timeout {
        Some(t) if t.is_finite() && t > 0.0 => t as u64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATION_JSON: &str = r#"{
        "rp": {"id": "example.com", "name": "Example"},
        "user": {"id": "dXNlcg", "name": "alice@example.com", "displayName": "Alice"},
        "challenge": "Y2hhbGxlbmdl",
        "pubKeyCredParams": [
            {"type": "public-key", "alg": -7},
            {"type": "public-key", "alg": -257}
        ],
        "timeout": 180000,
        "attestation": "none",
        "excludeCredentials": [{"id": "AQIDBA", "type": "public-key", "transports": ["internal"]}],
        "authenticatorSelection": {
            "authenticatorAttachment": "platform",
            "residentKey": "required",
            "requireResidentKey": true,
            "userVerification": "required"
        },
        "extensions": {"credProps": true}
    }"#;

    #[test]
    fn test_parse_creation_options() {
        let options = parse_creation_options(CREATION_JSON).unwrap();
        assert_eq!(options.rp.id, "example.com");
        assert_eq!(options.rp.name, "Example");
        assert_eq!(options.user.id, b"user");
        assert_eq!(options.user.display_name, "Alice");
        assert_eq!(options.challenge, b"challenge");
        assert_eq!(options.pub_key_cred_params.len(), 2);
        assert_eq!(options.pub_key_cred_params[1].alg, -257);
        assert_eq!(options.timeout, 180_000);
        assert_eq!(options.exclude_credentials[0].id, vec![1, 2, 3, 4]);
        assert_eq!(options.exclude_credentials[0].transports, vec!["internal"]);
        assert_eq!(
            options.authenticator_selection.authenticator_attachment.as_deref(),
            Some("platform")
        );
        assert!(options.authenticator_selection.require_resident_key);
        assert!(options.accepts_es256());
        assert!(options.excludes(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_creation_defaults() {
        let json = r#"{
            "rp": {"id": "example.com", "name": "Example"},
            "user": {"id": "dXNlcg", "name": "a", "displayName": "A"},
            "challenge": "Y2hhbGxlbmdl"
        }"#;
        let options = parse_creation_options(json).unwrap();
        assert_eq!(options.timeout, 0);
        assert_eq!(options.attestation, "none");
        assert!(options.exclude_credentials.is_empty());
        assert_eq!(options.authenticator_selection.user_verification, "preferred");
    }

    #[test]
    fn test_creation_missing_required_members() {
        for missing in ["rp", "user", "challenge"] {
            let mut value: serde_json::Value = serde_json::from_str(CREATION_JSON).unwrap();
            value.as_object_mut().unwrap().remove(missing);
            let err = parse_creation_options(&value.to_string()).unwrap_err();
            assert!(
                matches!(err, WebAuthnError::MalformedOptionsError(_)),
                "missing {missing} should be malformed"
            );
        }
    }

    #[test]
    fn test_creation_bad_base64() {
        let json = CREATION_JSON.replace("Y2hhbGxlbmdl", "not base64!");
        let err = parse_creation_options(&json).unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedOptionsError(_)));
    }

    #[test]
    fn test_parse_request_options() {
        let json = r#"{
            "challenge": "Y2hhbGxlbmdl",
            "timeout": 60000.0,
            "rpId": "example.com",
            "userVerification": "required",
            "allowCredentials": [{"id": "AQIDBA"}]
        }"#;
        let options = parse_request_options(json).unwrap();
        assert_eq!(options.challenge, b"challenge");
        assert_eq!(options.rp_id, "example.com");
        assert_eq!(options.timeout, 60_000);
        assert_eq!(options.user_verification, "required");
        assert_eq!(options.allow_credentials[0].r#type, "public-key");
    }

    #[test]
    fn test_request_missing_rp_id() {
        let err = parse_request_options(r#"{"challenge": "Y2hhbGxlbmdl"}"#).unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedOptionsError(_)));

        let err = parse_request_options(r#"{"rpId": "example.com"}"#).unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedOptionsError(_)));

        let err = parse_request_options("not json").unwrap_err();
        assert!(matches!(err, WebAuthnError::MalformedOptionsError(_)));
    }
}
