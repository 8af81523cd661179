//! Caller origin and signing identity
//!
//! App callers have no web origin. Their origin is derived from the hash of
//! the certificate that signed the app: `android:apk-key-hash:<b64url(sha256)>`.
//! Browsers and other privileged callers pass a web origin through instead.
//!
//! Every derivation fails closed when the caller has more than one signer.

use std::collections::HashSet;

use super::base64url;
use super::crypto::sha256;
use super::errors::WebAuthnError;

pub const APK_KEY_HASH_PREFIX: &str = "android:apk-key-hash:";

/// Certificates that signed the calling app
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigningInfo {
    pub signers: Vec<Vec<u8>>,
}

impl SigningInfo {
    #[must_use]
    pub fn single(certificate: Vec<u8>) -> Self {
        Self {
            signers: vec![certificate],
        }
    }

    #[must_use]
    pub fn has_multiple_signers(&self) -> bool {
        self.signers.len() > 1
    }

    /// The one signing certificate, or an error if there are zero or several
    ///
    /// # Errors
    /// Returns `WebAuthnError::OriginError` when the signer is ambiguous or absent.
    pub fn sole_signer(&self) -> Result<&[u8], WebAuthnError> {
        match self.signers.as_slice() {
            [cert] => Ok(cert.as_slice()),
            [] => Err(WebAuthnError::OriginError(
                "Caller has no signing certificate".to_string(),
            )),
            _ => Err(WebAuthnError::OriginError(format!(
                "Caller has {} signing certificates; refusing to pick one",
                self.signers.len()
            ))),
        }
    }
}

/// `android:apk-key-hash:` origin of an app caller
///
/// # Errors
/// Returns `WebAuthnError::OriginError` if the caller does not have exactly one signer.
pub fn app_origin(signing: &SigningInfo) -> Result<String, WebAuthnError> {
    let cert = signing.sole_signer()?;
    Ok(format!("{APK_KEY_HASH_PREFIX}{}", base64url::encode(sha256(cert))))
}

/// Colon-separated uppercase hex SHA-256 fingerprint of the signing
/// certificate, as used by Digital Asset Links
///
/// # Errors
/// Returns `WebAuthnError::OriginError` if the caller does not have exactly one signer.
pub fn certificate_fingerprint(signing: &SigningInfo) -> Result<String, WebAuthnError> {
    let cert = signing.sole_signer()?;
    Ok(normalized_fingerprint(cert))
}

fn normalized_fingerprint(cert: &[u8]) -> String {
    sha256(cert)
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Checks that an app is allowed to act for a website.
///
/// Implementations typically call the Digital Asset Links API; this crate
/// does no network I/O and only ships [`StaticAssetLinks`].
pub trait AssetLinkVerifier {
    fn verify(&self, website: &str, package_name: &str, fingerprint: &str) -> bool;
}

/// Fixed allowlist of `(website, package, fingerprint)` links
#[derive(Debug, Clone, Default)]
pub struct StaticAssetLinks {
    links: HashSet<(String, String, String)>,
}

impl StaticAssetLinks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_link(mut self, website: &str, package_name: &str, fingerprint: &str) -> Self {
        self.links.insert((
            website.to_string(),
            package_name.to_string(),
            fingerprint.to_uppercase(),
        ));
        self
    }
}

impl AssetLinkVerifier for StaticAssetLinks {
    fn verify(&self, website: &str, package_name: &str, fingerprint: &str) -> bool {
        self.links.contains(&(
            website.to_string(),
            package_name.to_string(),
            fingerprint.to_uppercase(),
        ))
    }
}

/// The app or browser asking for a credential
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerInfo {
    pub package_name: Option<String>,
    pub signing: SigningInfo,
    /// Web origin vouched for by the platform (browsers on the privileged allowlist)
    pub privileged_origin: Option<String>,
}

impl CallerInfo {
    #[must_use]
    pub fn app(package_name: &str, signing: SigningInfo) -> Self {
        Self {
            package_name: Some(package_name.to_string()),
            signing,
            privileged_origin: None,
        }
    }

    /// Origin to place in `clientDataJSON`
    ///
    /// # Errors
    /// Returns `WebAuthnError::OriginError` if there is no privileged origin
    /// and the signer is ambiguous or absent.
    pub fn resolve_origin(&self) -> Result<String, WebAuthnError> {
        match &self.privileged_origin {
            Some(origin) => Ok(origin.clone()),
            None => app_origin(&self.signing),
        }
    }

    /// Ask `verifier` whether this app may act for `https://{rp_id}`.
    /// Callers without a package name or with an ambiguous signer are rejected.
    pub fn verify_app_link(&self, verifier: &dyn AssetLinkVerifier, rp_id: &str) -> bool {
        let Some(package_name) = self.package_name.as_deref() else {
            log::warn!("Asset link check without a package name");
            return false;
        };
        match certificate_fingerprint(&self.signing) {
            Ok(fingerprint) => {
                let website = format!("https://{rp_id}");
                let linked = verifier.verify(&website, package_name, &fingerprint);
                log::info!("Asset link {website} -> {package_name}: linked={linked}");
                linked
            }
            Err(e) => {
                log::warn!("Asset link check failed closed: {e}");
                false
            }
        }
    }
}
