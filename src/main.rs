#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{anyhow, Context, Result};
use softauthn::{AssertionRequest, AuthenticatorSettings, Registration, SoftAuthenticator};

const USAGE: &str = "usage: softauthn <creation-options.json> [<request-options.json>]";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (creation_path, request_path) = match args.as_slice() {
        [creation] => (creation, None),
        [creation, request] => (creation, Some(request)),
        _ => return Err(anyhow!(USAGE)),
    };

    // Load configuration from Settings.toml and environment variables
    // This also initializes the logger
    let settings =
        AuthenticatorSettings::load().map_err(|e| anyhow!("Failed to load settings: {e}"))?;
    let caller = settings.caller.caller_info()?;
    let authenticator = SoftAuthenticator::new(settings.authenticator.clone())?;

    print_startup_info(&settings);

    let creation_json = std::fs::read_to_string(creation_path)
        .with_context(|| format!("Failed to read {creation_path}"))?;
    let registration = authenticator.register(&creation_json, &caller, None)?;
    self_check(&registration)?;
    println!("{}", registration.credential_json);

    if let Some(request_path) = request_path {
        let request_json = std::fs::read_to_string(request_path)
            .with_context(|| format!("Failed to read {request_path}"))?;
        let assertion = authenticator.authenticate(&AssertionRequest {
            request_json: &request_json,
            caller: &caller,
            key: &registration.key,
            credential_id: &registration.credential_id,
            user_handle: &registration.user_handle,
            sign_count: 0,
            client_data_hash: None,
        })?;
        println!("{assertion}");
    }

    Ok(())
}

/// Decode the attestation object we just produced and confirm it names our credential
#[cfg(feature = "inspect")]
fn self_check(registration: &Registration) -> Result<()> {
    let credential: serde_json::Value = serde_json::from_str(&registration.credential_json)?;
    let attestation_object = credential["response"]["attestationObject"]
        .as_str()
        .ok_or_else(|| anyhow!("Registration response has no attestationObject"))?;
    let parsed = softauthn::webauthn::inspect::parse_attestation_object(attestation_object)?;

    if parsed.authenticator_data.credential_id.as_deref()
        != Some(registration.credential_id.as_slice())
    {
        return Err(anyhow!("Attestation object does not carry the new credential id"));
    }
    log::debug!(
        "Self-check passed: fmt={} flags={:#04x}",
        parsed.fmt,
        parsed.authenticator_data.flags
    );
    Ok(())
}

#[cfg(not(feature = "inspect"))]
fn self_check(_registration: &Registration) -> Result<()> {
    Ok(())
}

fn print_startup_info(settings: &AuthenticatorSettings) {
    eprintln!("softauthn {}", softauthn::VERSION);
    eprintln!("  Attachment: {}", settings.authenticator.attachment);
    eprintln!("  Transports: {}", settings.authenticator.transports.join(", "));
    eprintln!("  AAGUID: {}", settings.authenticator.aaguid);
    eprintln!("  Caller package: {}", settings.caller.package_name);
    if let Some(origin) = &settings.caller.privileged_origin {
        eprintln!("  Privileged origin: {origin}");
    }
}
