//! Protocol variants and the query parameter names they reserve

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Service parameter names reserved when the caller names none
pub const DEFAULT_SERVICE_PARAMETER_NAMES: &str = "service,TARGET";

/// Supported protocol variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    Cas1,
    Cas2,
    #[default]
    Cas3,
    Saml11,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [Protocol::Cas1, Protocol::Cas2, Protocol::Cas3, Protocol::Saml11];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Protocol::Cas1 => "cas1",
            Protocol::Cas2 => "cas2",
            Protocol::Cas3 => "cas3",
            Protocol::Saml11 => "saml11",
        }
    }

    /// Name of the parameter carrying the service URL
    pub const fn service_parameter_name(&self) -> &'static str {
        match self {
            Protocol::Saml11 => "TARGET",
            _ => "service",
        }
    }

    /// Name of the parameter carrying the validation artifact
    pub const fn artifact_parameter_name(&self) -> &'static str {
        match self {
            Protocol::Saml11 => "SAMLart",
            _ => "ticket",
        }
    }

    pub fn parameter_names(&self) -> ProtocolParameterNames {
        ProtocolParameterNames::new(self.service_parameter_name(), self.artifact_parameter_name())
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown protocol: {0}")]
pub struct UnknownProtocol(pub String);

impl FromStr for Protocol {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownProtocol(s.to_string()))
    }
}

/// Query parameter names stripped from the service URL.
///
/// The service name may be a comma separated list; each listed name is
/// reserved on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolParameterNames {
    service: Vec<String>,
    artifact: String,
}

impl ProtocolParameterNames {
    pub fn new(service: &str, artifact: &str) -> Self {
        Self {
            service: service
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            artifact: artifact.trim().to_string(),
        }
    }

    /// Reserve only `artifact`, plus [`DEFAULT_SERVICE_PARAMETER_NAMES`]
    pub fn with_default_service(artifact: &str) -> Self {
        Self::new(DEFAULT_SERVICE_PARAMETER_NAMES, artifact)
    }

    pub fn service(&self) -> &[String] {
        &self.service
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Exact, case-sensitive name match
    pub fn is_reserved(&self, name: &str) -> bool {
        (!self.artifact.is_empty() && name == self.artifact)
            || self.service.iter().any(|s| s == name)
    }
}

impl Default for ProtocolParameterNames {
    fn default() -> Self {
        Protocol::default().parameter_names()
    }
}

impl From<Protocol> for ProtocolParameterNames {
    fn from(protocol: Protocol) -> Self {
        protocol.parameter_names()
    }
}
