//! Configuration system for caskit-rs
//!
//! Settings live in a flat properties file. The file is located once at
//! startup through the embedding component's init parameters, then every key
//! is looked up as `<Scope>.<key>` before falling back to the bare `<key>`.

use serde::{Deserialize, Serialize};

pub mod error;
pub mod keys;
pub mod loader;
pub mod store;
pub mod validation;

pub use error::{ConfigError, Result};
pub use keys::ConfigurationKey;
pub use loader::{
    ConfigurationResolver, ConfigurationSource, InitConfig, InitParameters, LoadedConfiguration,
};
pub use store::PropertyStore;

/// Resolved client settings, snapshot taken once after initialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    /// Allowed server names, as configured
    pub server_name: Option<String>,

    /// Fixed service URL
    pub service: Option<String>,

    /// Re-encode query values and pass the URL through the response hook
    #[serde(default = "default_encode_service_url")]
    pub encode_service_url: bool,

    /// Protocol variant name
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Overrides the protocol's service parameter name
    pub service_parameter_name: Option<String>,

    /// Overrides the protocol's artifact parameter name
    pub artifact_parameter_name: Option<String>,
}

fn default_encode_service_url() -> bool {
    keys::ENCODE_SERVICE_URL.default_value().unwrap_or(true)
}

fn default_protocol() -> String {
    keys::PROTOCOL.default_value().unwrap_or("cas3").to_string()
}


impl ClientConfig {
    /// Read every known key from an initialized resolver, then validate
    pub fn resolve(resolver: &ConfigurationResolver) -> Result<Self> {
        let loaded = resolver.loaded()?;
        Self::from_loaded(loaded)
    }

    /// Same as [`ClientConfig::resolve`] for a configuration already in hand
    pub fn from_loaded(loaded: &LoadedConfiguration) -> Result<Self> {
        let text = |key: &ConfigurationKey<&str>| {
            loaded
                .get(key)
                .map(str::to_string)
                .or_else(|| key.default_value().map(str::to_string))
        };

        let encode_service_url = match loaded.get(&keys::ENCODE_SERVICE_URL) {
            Some(value) => parse_bool(keys::ENCODE_SERVICE_URL.name(), value)?,
            None => default_encode_service_url(),
        };

        let mut config = Self {
            server_name: text(&keys::SERVER_NAME),
            service: text(&keys::SERVICE),
            encode_service_url,
            protocol: text(&keys::PROTOCOL).unwrap_or_else(default_protocol),
            service_parameter_name: text(&keys::SERVICE_PARAMETER_NAME),
            artifact_parameter_name: text(&keys::ARTIFACT_PARAMETER_NAME),
        };

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Parse a properties document for `scope` without touching the filesystem
    pub fn from_properties(scope: &str, text: &str) -> Result<Self> {
        let loaded = LoadedConfiguration::from_store(scope, PropertyStore::parse(text));
        Self::from_loaded(&loaded)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    fn normalize(&mut self) {
        if let Some(server_name) = self.server_name.as_mut() {
            let original = server_name.trim().to_string();
            let trimmed = original.trim_end_matches('/').to_string();
            if trimmed != original {
                tracing::info!(
                    "Eliminated extra slash from serverName [{}]. It is now [{}]",
                    original,
                    trimmed
                );
            }
            *server_name = trimmed;
        }
    }
}

/// Parse a boolean setting; accepts true/false, yes/no, 1/0
pub fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}
