use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::webauthn::{CallerInfo, SigningInfo, WebAuthnError, WebAuthnSettings};

/// Environment variable naming a directory whose `Settings.toml` overrides the local one
pub const CONFIG_DIR_ENV: &str = "SOFTAUTHN_CONFIG_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AuthenticatorSettings {
    pub authenticator: WebAuthnSettings,
    pub caller: CallerSettings,
    pub logging: LoggingSettings,
}

/// Identity of the simulated calling app or browser
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CallerSettings {
    pub package_name: String,
    /// Standard base64 DER certificates that signed the app
    pub signing_certificates: Vec<String>,
    /// Set for a browser caller that vouches for a web origin itself
    pub privileged_origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for CallerSettings {
    fn default() -> Self {
        Self {
            package_name: "com.example.softauthn".to_string(),
            signing_certificates: vec![
                general_purpose::STANDARD.encode(b"softauthn-debug-certificate")
            ],
            privileged_origin: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CallerSettings {
    /// Decode the configured caller into a [`CallerInfo`]
    ///
    /// # Errors
    ///
    /// Returns `WebAuthnError::ConfigurationError` if a signing certificate is not valid base64.
    pub fn caller_info(&self) -> Result<CallerInfo, WebAuthnError> {
        let signers = self
            .signing_certificates
            .iter()
            .map(|cert| {
                general_purpose::STANDARD.decode(cert.trim()).map_err(|e| {
                    WebAuthnError::ConfigurationError(format!("Invalid signing certificate: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CallerInfo {
            package_name: Some(self.package_name.clone()).filter(|name| !name.is_empty()),
            signing: SigningInfo { signers },
            privileged_origin: self.privileged_origin.clone(),
        })
    }
}

impl AuthenticatorSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    /// - The resulting authenticator settings are invalid
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let (mut settings, sources) = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        Self::initialize_logging(&settings.logging)?;
        // File sources are only reported once a logger exists
        for source in &sources {
            log::info!("{source}");
        }
        settings.authenticator.validate()?;

        Ok(settings)
    }

    /// Load settings from a single TOML file, without touching the logger or environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        let settings: Self = basic_toml::from_str(&toml_content)?;
        Ok(settings)
    }

    /// Initialize logging; `RUST_LOG` wins over `logging.level`
    ///
    /// # Errors
    ///
    /// Returns an error if a logger is already installed
    fn initialize_logging(logging: &LoggingSettings) -> Result<(), Box<dyn std::error::Error>> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(&logging.level),
        )
        .try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `SOFTAUTHN_CONFIG_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    fn load_base_settings() -> Result<(Self, Vec<String>), Box<dyn std::error::Error>> {
        let config_dir = std::env::var(CONFIG_DIR_ENV).ok();
        Self::load_layered(Path::new("Settings.toml"), config_dir.as_deref().map(Path::new))
    }

    /// Layer `local_path` and then `config_dir/Settings.toml` over the defaults.
    /// Returns the settings with one line per file source consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing settings file cannot be read or parsed.
    pub fn load_layered(
        local_path: &Path,
        config_dir: Option<&Path>,
    ) -> Result<(Self, Vec<String>), Box<dyn std::error::Error>> {
        let mut settings = Self::default();
        let mut sources = Vec::new();

        if local_path.exists() {
            settings = Self::load_from_path(local_path)?;
            sources.push(format!("Loaded base settings from {}", local_path.display()));
        }

        if let Some(config_dir) = config_dir {
            let override_path = config_dir.join("Settings.toml");
            if override_path.exists() {
                settings = Self::load_from_path(&override_path)?;
                sources.push(format!("Overriding settings from {}", override_path.display()));
            } else {
                sources.push(format!(
                    "{CONFIG_DIR_ENV} set but no Settings.toml found at: {}",
                    override_path.display()
                ));
            }
        }

        Ok((settings, sources))
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_authenticator_env_overrides(&mut settings.authenticator);
        Self::apply_caller_env_overrides(&mut settings.caller);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_authenticator_env_overrides(authenticator: &mut WebAuthnSettings) {
        if let Ok(attachment) = std::env::var("SOFTAUTHN_ATTACHMENT") {
            authenticator.attachment = attachment;
        }
        if let Ok(aaguid) = std::env::var("SOFTAUTHN_AAGUID") {
            authenticator.aaguid = aaguid;
        }
    }

    fn apply_caller_env_overrides(caller: &mut CallerSettings) {
        if let Ok(package_name) = std::env::var("SOFTAUTHN_PACKAGE_NAME") {
            caller.package_name = package_name;
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }
}
