// Integration test for settings files and the authenticator they configure
#![cfg(feature = "inspect")]
use serde_json::Value;
use serial_test::serial;
use softauthn::settings::AuthenticatorSettings;
use softauthn::webauthn::inspect::parse_attestation_object;
use softauthn::SoftAuthenticator;
use std::io::Write;

const CREATION_OPTIONS: &str = r#"{
    "challenge": "Y2hhbGxlbmdl",
    "rp": {"id": "example.com", "name": "Example"},
    "user": {"id": "dXNlcg", "name": "user", "displayName": "User"}
}"#;

fn write_settings(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_settings_file_drives_registration() {
    let file = write_settings(
        r#"
[authenticator]
attachment = "cross-platform"
aaguid = "ea9b8d66-4d01-1d21-3ce4-b6b48cb575d4"
transports = ["internal"]

[authenticator.registration_flags]
user_present = true
user_verified = false
backup_eligible = false
backup_state = false

[caller]
package_name = "com.android.chrome"
privileged_origin = "https://example.com"
"#,
    );
    let settings = AuthenticatorSettings::load_from_path(file.path()).unwrap();
    let caller = settings.caller.caller_info().unwrap();
    let authenticator = SoftAuthenticator::new(settings.authenticator).unwrap();

    let registration = authenticator.register(CREATION_OPTIONS, &caller, None).unwrap();
    let value: Value = serde_json::from_str(&registration.credential_json).unwrap();
    assert_eq!(value["authenticatorAttachment"], "cross-platform");
    assert_eq!(value["response"]["transports"], serde_json::json!(["internal"]));

    let parsed =
        parse_attestation_object(value["response"]["attestationObject"].as_str().unwrap()).unwrap();
    assert_eq!(parsed.authenticator_data.flags, 0x41);
    assert_eq!(
        parsed.authenticator_data.aaguid.map(|a| a[0]),
        Some(0xea)
    );
}

#[test]
fn test_registration_policy_from_file() {
    let file = write_settings(
        r#"
[authenticator.registration_policy]
attestation = "direct"
"#,
    );
    let settings = AuthenticatorSettings::load_from_path(file.path()).unwrap();
    let body: Value = serde_json::from_str(
        &settings
            .authenticator
            .registration_policy
            .to_request_body()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(body["attestation"], "direct");
    assert_eq!(body["authenticatorSelection"]["residentKey"], "required");
}

#[test]
fn test_malformed_settings_file_is_an_error() {
    let file = write_settings("[authenticator\nattachment = ");
    assert!(AuthenticatorSettings::load_from_path(file.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides_win_over_file() {
    let file = write_settings(
        r#"
[caller]
package_name = "com.example.file"
"#,
    );
    let mut settings = AuthenticatorSettings::load_from_path(file.path()).unwrap();

    std::env::set_var("SOFTAUTHN_PACKAGE_NAME", "com.example.env");
    AuthenticatorSettings::apply_env_overrides(&mut settings);
    std::env::remove_var("SOFTAUTHN_PACKAGE_NAME");

    assert_eq!(settings.caller.package_name, "com.example.env");
}
