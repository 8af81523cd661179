#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the softauthn library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod settings;
pub mod webauthn;

/// Re-export commonly used items
pub use settings::AuthenticatorSettings;
pub use webauthn::{
    AssertionRequest, CallerInfo, Registration, SigningInfo, SoftAuthenticator, SoftwareKey,
    WebAuthnError, WebAuthnSettings,
};
