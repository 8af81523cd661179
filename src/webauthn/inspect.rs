//! Attestation object and authenticator data parsing
//!
//! Reads back what the builders produce, the way a relying party would:
//! decode the attestation object with a general CBOR decoder, then walk the
//! binary authenticator data.

use ciborium::de::from_reader;
use ciborium::value::Value;

use super::authenticator_data::{AUTH_DATA_MIN_LEN, FLAG_ATTESTED_CREDENTIAL_DATA};
use super::base64url;
use super::errors::WebAuthnError;

/// Authenticator data split into its fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAuthenticatorData {
    pub rp_id_hash: [u8; 32],
    pub flags: u8,
    pub sign_count: u32,
    pub aaguid: Option<[u8; 16]>,
    pub credential_id: Option<Vec<u8>>,
    pub credential_public_key: Option<Vec<u8>>, // COSE-encoded public key
}

/// A decoded attestation object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttestation {
    pub fmt: String,
    pub keys: Vec<String>, // Map keys in encoded order
    pub att_stmt_empty: bool,
    pub auth_data: Vec<u8>,
    pub authenticator_data: ParsedAuthenticatorData,
}

/// Parse binary authenticator data
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` if the data is truncated.
pub fn parse_authenticator_data(
    auth_data: &[u8],
) -> Result<ParsedAuthenticatorData, WebAuthnError> {
    if auth_data.len() < AUTH_DATA_MIN_LEN {
        return Err(WebAuthnError::EncodingError(
            "Auth data too short".to_string(),
        ));
    }

    let mut rp_id_hash = [0u8; 32];
    rp_id_hash.copy_from_slice(&auth_data[..32]);
    let flags = auth_data[32];
    let sign_count =
        u32::from_be_bytes([auth_data[33], auth_data[34], auth_data[35], auth_data[36]]);

    let mut parsed = ParsedAuthenticatorData {
        rp_id_hash,
        flags,
        sign_count,
        aaguid: None,
        credential_id: None,
        credential_public_key: None,
    };

    if flags & FLAG_ATTESTED_CREDENTIAL_DATA == 0 {
        return Ok(parsed);
    }

    // Skip RP ID hash (32 bytes), flags (1 byte), counter (4 bytes)
    let mut pos = AUTH_DATA_MIN_LEN;

    if auth_data.len() < pos + 18 {
        return Err(WebAuthnError::EncodingError(
            "Auth data too short for attested credential data".to_string(),
        ));
    }
    let mut aaguid = [0u8; 16];
    aaguid.copy_from_slice(&auth_data[pos..pos + 16]);
    pos += 16;

    let id_len = usize::from(u16::from_be_bytes([auth_data[pos], auth_data[pos + 1]]));
    pos += 2;

    if auth_data.len() < pos + id_len {
        return Err(WebAuthnError::EncodingError(
            "Auth data too short for credential ID".to_string(),
        ));
    }
    let credential_id = auth_data[pos..pos + id_len].to_vec();
    pos += id_len;

    // The rest is the COSE public key
    if auth_data.len() <= pos {
        return Err(WebAuthnError::EncodingError(
            "Auth data too short for public key".to_string(),
        ));
    }

    parsed.aaguid = Some(aaguid);
    parsed.credential_id = Some(credential_id);
    parsed.credential_public_key = Some(auth_data[pos..].to_vec());
    Ok(parsed)
}

/// Decode a base64url attestation object and its authenticator data
///
/// # Errors
/// Returns `WebAuthnError::EncodingError` if the object is not valid CBOR,
/// is not a map, or lacks `fmt` or `authData`.
pub fn parse_attestation_object(
    attestation_object_b64: &str,
) -> Result<ParsedAttestation, WebAuthnError> {
    let attestation_bytes = base64url::decode(attestation_object_b64)?;

    let attestation: Value = from_reader(&attestation_bytes[..])
        .map_err(|_| WebAuthnError::EncodingError("Invalid CBOR attestation format".to_string()))?;

    let Some(map) = attestation.as_map() else {
        return Err(WebAuthnError::EncodingError(
            "Attestation object is not a map".to_string(),
        ));
    };

    let keys: Vec<String> = map
        .iter()
        .filter_map(|(k, _)| k.as_text().map(str::to_string))
        .collect();
    let field = |name: &str| map.iter().find(|(k, _)| k.as_text() == Some(name)).map(|(_, v)| v);

    let Some(fmt) = field("fmt").and_then(Value::as_text) else {
        return Err(WebAuthnError::EncodingError(
            "Missing fmt in attestation".to_string(),
        ));
    };
    let Some(auth_data) = field("authData").and_then(Value::as_bytes) else {
        return Err(WebAuthnError::EncodingError(
            "Missing authData in attestation".to_string(),
        ));
    };
    let att_stmt_empty = field("attStmt")
        .and_then(Value::as_map)
        .is_some_and(Vec::is_empty);

    Ok(ParsedAttestation {
        fmt: fmt.to_string(),
        keys,
        att_stmt_empty,
        auth_data: auth_data.clone(),
        authenticator_data: parse_authenticator_data(auth_data)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webauthn::attestation::attestation_object;
    use crate::webauthn::authenticator_data::{
        build_authenticator_data, AttestedCredentialData, AuthenticatorFlags,
    };

    #[test]
    fn test_parse_assertion_auth_data() {
        let data =
            build_authenticator_data("example.com", AuthenticatorFlags::all(), 3, None).unwrap();
        let parsed = parse_authenticator_data(&data).unwrap();
        assert_eq!(parsed.flags, 0x1d);
        assert_eq!(parsed.sign_count, 3);
        assert!(parsed.credential_id.is_none());
    }

    #[test]
    fn test_round_trip_attestation_object() {
        let attested = AttestedCredentialData {
            aaguid: [0; 16],
            credential_id: vec![1, 2, 3, 4],
            public_key_cose: vec![0xa1, 0x01, 0x02],
        };
        let data =
            build_authenticator_data("example.com", AuthenticatorFlags::all(), 0, Some(&attested))
                .unwrap();
        let object = attestation_object(&data).unwrap();

        let parsed = parse_attestation_object(&base64url::encode(&object)).unwrap();
        assert_eq!(parsed.keys, vec!["fmt", "attStmt", "authData"]);
        assert_eq!(parsed.fmt, "none");
        assert!(parsed.att_stmt_empty);
        assert_eq!(parsed.authenticator_data.credential_id, Some(vec![1, 2, 3, 4]));
        assert_eq!(
            parsed.authenticator_data.credential_public_key,
            Some(vec![0xa1, 0x01, 0x02])
        );
    }

    #[test]
    fn test_truncated_data_rejected() {
        assert!(parse_authenticator_data(&[0u8; 36]).is_err());

        let mut data = vec![0u8; 37];
        data[32] = FLAG_ATTESTED_CREDENTIAL_DATA;
        data.extend([0u8; 16]);
        data.extend([0x00, 0x08, 1, 2]);
        assert!(parse_authenticator_data(&data).is_err());
    }

    #[test]
    fn test_rejects_non_map() {
        // CBOR array(0)
        assert!(parse_attestation_object(&base64url::encode([0x80u8])).is_err());
        assert!(parse_attestation_object("%%%").is_err());
    }
}
