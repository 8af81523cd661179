// End-to-end registration and sign-in through the public API
#![cfg(feature = "inspect")]
use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};
use serde_json::Value;
use softauthn::webauthn::inspect::{parse_attestation_object, parse_authenticator_data};
use softauthn::webauthn::{
    base64url, build_assertion_response, build_attestation_response, parse_creation_options,
    parse_request_options, sha256, wrap_credential, AssertionInput, AssertionRequest,
    AttestationInput, AuthenticatorFlags, CallerInfo, CoseEc2Key, CredentialSigner, SigningInfo,
    SoftAuthenticator, SoftwareKey,
};

const CREATION_OPTIONS: &str = r#"{
    "challenge": "Y2hhbGxlbmdl",
    "rp": {"id": "example.com", "name": "Example"},
    "user": {"id": "dXNlci1pZA", "name": "alice@example.com", "displayName": "Alice"},
    "pubKeyCredParams": [{"type": "public-key", "alg": -7}],
    "timeout": 60000,
    "attestation": "none",
    "authenticatorSelection": {"residentKey": "required", "userVerification": "required"}
}"#;

const REQUEST_OPTIONS: &str = r#"{
    "challenge": "c2lnbi1pbg",
    "rpId": "example.com",
    "userVerification": "required"
}"#;

const EXAMPLE_COM_HASH: &str = "a379a6f6eeafb9a55e378c118034e2751e682fab9f2d30ab13d2125586ce1947";

fn hex(input: &str) -> Vec<u8> {
    (0..input.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&input[i..i + 2], 16).unwrap())
        .collect()
}

fn up_uv() -> AuthenticatorFlags {
    AuthenticatorFlags {
        user_present: true,
        user_verified: true,
        ..Default::default()
    }
}

fn app_caller() -> CallerInfo {
    CallerInfo::app("com.example.app", SigningInfo::single(b"app-cert".to_vec()))
}

#[test]
fn test_registration_scenario_byte_layout() {
    let options = parse_creation_options(CREATION_OPTIONS).unwrap();
    let key = SoftwareKey::generate().unwrap();
    let cose_key = CoseEc2Key::from_uncompressed_point(&key.public_key_point()).unwrap();
    let cose_bytes = cose_key.encode().unwrap();
    let spki = cose_key.to_spki();
    let credential_id = [1u8, 2, 3, 4];

    let response = build_attestation_response(
        AttestationInput::new(&options, &credential_id, &cose_bytes, "https://example.com", up_uv())
            .with_spki(&spki),
    )
    .unwrap();

    let auth_data = &response.authenticator_data;
    assert_eq!(&auth_data[..32], hex(EXAMPLE_COM_HASH).as_slice());
    assert_eq!(auth_data[32], 0x45);
    assert_eq!(&auth_data[33..37], &[0, 0, 0, 0]);
    assert_eq!(&auth_data[37..53], &[0u8; 16]);
    assert_eq!(&auth_data[53..55], &[0x00, 0x04]);
    assert_eq!(&auth_data[55..59], &credential_id);
    assert_eq!(&auth_data[59..], cose_bytes.as_slice());

    let json = wrap_credential(&credential_id, response, "platform").unwrap();
    let value: Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["id"], "AQIDBA");
    assert_eq!(value["rawId"], "AQIDBA");
    assert_eq!(value["type"], "public-key");
    assert_eq!(value["authenticatorAttachment"], "platform");
    assert_eq!(value["clientExtensionResults"]["credProps"]["rk"], true);
    assert_eq!(value["response"]["publicKeyAlgorithm"], -7);
    assert!(value["response"]["publicKey"]
        .as_str()
        .unwrap()
        .starts_with("MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE"));

    let client_data =
        base64url::decode(value["response"]["clientDataJSON"].as_str().unwrap()).unwrap();
    assert_eq!(
        String::from_utf8(client_data).unwrap(),
        r#"{"type":"webauthn.create","challenge":"Y2hhbGxlbmdl","origin":"https://example.com"}"#
    );

    let parsed =
        parse_attestation_object(value["response"]["attestationObject"].as_str().unwrap()).unwrap();
    assert_eq!(parsed.keys, vec!["fmt", "attStmt", "authData"]);
    assert_eq!(parsed.fmt, "none");
    assert!(parsed.att_stmt_empty);
    assert_eq!(parsed.authenticator_data.credential_id, Some(credential_id.to_vec()));
}

#[test]
fn test_golden_attestation_object_prefix() {
    let options = parse_creation_options(CREATION_OPTIONS).unwrap();
    let cose_bytes = [0xa1u8, 0x01, 0x02];
    let response = build_attestation_response(AttestationInput::new(
        &options,
        &[1, 2, 3, 4],
        &cose_bytes,
        "https://example.com",
        up_uv(),
    ))
    .unwrap();

    // {"fmt": "none", "attStmt": {}, "authData": bytes(62)}
    let mut expected = hex(concat!(
        "a3",
        "63666d74",
        "646e6f6e65",
        "6761747453746d74",
        "a0",
        "686175746844617461",
        "583e"
    ));
    expected.extend(response.authenticator_data.iter());
    assert_eq!(response.attestation_object, expected);
    assert_eq!(response.authenticator_data.len(), 62);
}

#[test]
fn test_missing_public_key_is_not_fatal() {
    let options = parse_creation_options(CREATION_OPTIONS).unwrap();
    let response = build_attestation_response(AttestationInput::new(
        &options,
        &[1, 2, 3, 4],
        &[0xa1, 0x01, 0x02],
        "https://example.com",
        up_uv(),
    ))
    .unwrap();

    assert!(response.public_key_missing());
    let value: Value =
        serde_json::from_str(&wrap_credential(&[1, 2, 3, 4], response, "platform").unwrap())
            .unwrap();
    assert!(value["response"].get("publicKey").is_none());
    assert_eq!(value["response"]["publicKeyAlgorithm"], -7);
}

#[test]
fn test_assertion_data_to_sign_and_signature() {
    let options = parse_request_options(REQUEST_OPTIONS).unwrap();
    let key = SoftwareKey::generate().unwrap();
    let response = build_assertion_response(
        AssertionInput::new(&options, "https://example.com", up_uv(), b"user-id")
            .with_sign_count(7),
    )
    .unwrap();

    let data_to_sign = response.data_to_sign();
    assert_eq!(data_to_sign.len(), 37 + 32);
    assert_eq!(&data_to_sign[..37], response.authenticator_data.as_slice());
    assert_eq!(&data_to_sign[37..], &sha256(&response.client_data_json()));
    assert_eq!(response.authenticator_data[32], 0x05);
    assert_eq!(&response.authenticator_data[33..37], &[0, 0, 0, 7]);

    let signed = response.sign_with(&key).unwrap();
    UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, key.public_key_point())
        .verify(&data_to_sign, &signed.signature)
        .unwrap();
}

#[test]
fn test_register_then_authenticate() {
    let authenticator = SoftAuthenticator::default();
    let caller = app_caller();

    let registration = authenticator.register(CREATION_OPTIONS, &caller, None).unwrap();
    assert_eq!(registration.user_handle, b"user-id");

    let registered: Value = serde_json::from_str(&registration.credential_json).unwrap();
    let client_data = base64url::decode(registered["response"]["clientDataJSON"].as_str().unwrap())
        .unwrap();
    let client_data: Value = serde_json::from_slice(&client_data).unwrap();
    assert_eq!(client_data["origin"], caller.resolve_origin().unwrap());
    assert_eq!(client_data["androidPackageName"], "com.example.app");

    let assertion_json = authenticator
        .authenticate(&AssertionRequest {
            request_json: REQUEST_OPTIONS,
            caller: &caller,
            key: &registration.key,
            credential_id: &registration.credential_id,
            user_handle: &registration.user_handle,
            sign_count: 1,
            client_data_hash: None,
        })
        .unwrap();
    let assertion: Value = serde_json::from_str(&assertion_json).unwrap();
    assert_eq!(assertion["id"], registered["id"]);
    assert_eq!(assertion["response"]["userHandle"], "dXNlci1pZA");

    let auth_data =
        base64url::decode(assertion["response"]["authenticatorData"].as_str().unwrap()).unwrap();
    let parsed = parse_authenticator_data(&auth_data).unwrap();
    assert_eq!(parsed.rp_id_hash.to_vec(), hex(EXAMPLE_COM_HASH));
    assert_eq!(parsed.sign_count, 1);

    let client_data_json =
        base64url::decode(assertion["response"]["clientDataJSON"].as_str().unwrap()).unwrap();
    let mut signed_data = auth_data.clone();
    signed_data.extend_from_slice(&sha256(&client_data_json));
    let signature =
        base64url::decode(assertion["response"]["signature"].as_str().unwrap()).unwrap();
    UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, registration.key.public_key_point())
        .verify(&signed_data, &signature)
        .unwrap();
}

#[test]
fn test_external_client_data_hash_omits_client_data_json() {
    let authenticator = SoftAuthenticator::default();
    let caller = CallerInfo {
        privileged_origin: Some("https://example.com".to_string()),
        ..app_caller()
    };
    let hash = [0x11u8; 32];

    let registration = authenticator.register(CREATION_OPTIONS, &caller, Some(&hash)).unwrap();
    let value: Value = serde_json::from_str(&registration.credential_json).unwrap();
    assert!(value["response"].get("clientDataJSON").is_none());

    let assertion_json = authenticator
        .authenticate(&AssertionRequest {
            request_json: REQUEST_OPTIONS,
            caller: &caller,
            key: &registration.key,
            credential_id: &registration.credential_id,
            user_handle: &registration.user_handle,
            sign_count: 0,
            client_data_hash: Some(&hash),
        })
        .unwrap();
    let assertion: Value = serde_json::from_str(&assertion_json).unwrap();
    assert!(assertion["response"].get("clientDataJSON").is_none());

    let auth_data =
        base64url::decode(assertion["response"]["authenticatorData"].as_str().unwrap()).unwrap();
    let mut signed_data = auth_data;
    signed_data.extend_from_slice(&hash);
    let signature =
        base64url::decode(assertion["response"]["signature"].as_str().unwrap()).unwrap();
    UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, registration.key.public_key_point())
        .verify(&signed_data, &signature)
        .unwrap();
}
