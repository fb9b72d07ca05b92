//! Named configuration settings and their defaults

/// A named setting with a typed default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigurationKey<T> {
    name: &'static str,
    default: Option<T>,
}

impl<T: Copy> ConfigurationKey<T> {
    pub const fn new(name: &'static str, default: Option<T>) -> Self {
        Self { name, default }
    }

    /// Property name as written in the store
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn default_value(&self) -> Option<T> {
        self.default
    }
}

/// Allowed server names, whitespace or comma separated
pub const SERVER_NAME: ConfigurationKey<&str> = ConfigurationKey::new("serverName", None);

/// Fixed service URL; bypasses reconstruction when set
pub const SERVICE: ConfigurationKey<&str> = ConfigurationKey::new("service", None);

/// Whether surviving query values are re-encoded and the URL passed to the response hook
pub const ENCODE_SERVICE_URL: ConfigurationKey<bool> =
    ConfigurationKey::new("encodeServiceUrl", Some(true));

/// Overrides the protocol's service parameter name (comma separated list allowed)
pub const SERVICE_PARAMETER_NAME: ConfigurationKey<&str> =
    ConfigurationKey::new("serviceParameterName", None);

/// Overrides the protocol's artifact parameter name
pub const ARTIFACT_PARAMETER_NAME: ConfigurationKey<&str> =
    ConfigurationKey::new("artifactParameterName", None);

/// Protocol variant (`cas1`, `cas2`, `cas3`, `saml11`)
pub const PROTOCOL: ConfigurationKey<&str> = ConfigurationKey::new("protocol", Some("cas3"));

/// Every key the client understands
pub const ALL_KEY_NAMES: [&str; 6] = [
    SERVER_NAME.name(),
    SERVICE.name(),
    ENCODE_SERVICE_URL.name(),
    SERVICE_PARAMETER_NAME.name(),
    ARTIFACT_PARAMETER_NAME.name(),
    PROTOCOL.name(),
];
