//! Allowed server name matching
//!
//! The configured allowlist pins the origin of the service URL, so a forged
//! `Host` header cannot redirect the browser to a foreign site after login.
//! Each candidate has the form `[scheme://]host[:port][/path]`; the first
//! candidate whose host equals the request host (ignoring ASCII case) wins.

use std::{convert::Infallible, fmt, str::FromStr};

use thiserror::Error;

use crate::request::{ServiceRequest, comparison_host};

/// Schemes a service URL may use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub const fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("http") {
            Some(Scheme::Http)
        } else if s.eq_ignore_ascii_case("https") {
            Some(Scheme::Https)
        } else {
            None
        }
    }

    /// Scheme of the inbound request; the secure flag wins over the raw scheme
    pub fn of_request<R: ServiceRequest + ?Sized>(request: &R) -> Self {
        if request.is_secure() {
            return Scheme::Https;
        }
        Scheme::parse(request.scheme()).unwrap_or(Scheme::Http)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an allowlist candidate was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedServerName {
    #[error("unsupported scheme in server name: {0}")]
    UnsupportedScheme(String),

    #[error("missing host in server name: {0}")]
    EmptyHost(String),

    #[error("invalid host in server name: {0}")]
    InvalidHost(String),

    #[error("invalid port in server name: {0}")]
    InvalidPort(String),
}

/// One parsed allowlist candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerNameEntry {
    scheme: Option<Scheme>,
    host: String,
    port: Option<u16>,
    path: String,
}

impl ServerNameEntry {
    pub fn parse(candidate: &str) -> Result<Self, MalformedServerName> {
        let malformed = candidate.to_string();

        let (scheme, rest) = match candidate.split_once("://") {
            Some((scheme, rest)) => {
                let scheme = Scheme::parse(scheme)
                    .ok_or_else(|| MalformedServerName::UnsupportedScheme(malformed.clone()))?;
                (Some(scheme), rest)
            }
            None => (None, candidate),
        };

        if rest.contains(['?', '#', '@', '\\']) {
            return Err(MalformedServerName::InvalidHost(malformed));
        }

        let (authority, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], rest[idx..].trim_end_matches('/')),
            None => (rest, ""),
        };

        let (host, port) = split_authority(authority)
            .ok_or_else(|| MalformedServerName::InvalidPort(malformed.clone()))?;

        if host.is_empty() {
            return Err(MalformedServerName::EmptyHost(malformed));
        }
        if !is_valid_host(host) {
            return Err(MalformedServerName::InvalidHost(malformed));
        }

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
            path: path.to_string(),
        })
    }

    /// Explicit scheme, if the candidate named one
    pub fn scheme(&self) -> Option<Scheme> {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Explicit port, if the candidate named one
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Path prefix, without a trailing slash
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn matches_host(&self, host: &str) -> bool {
        self.host.eq_ignore_ascii_case(host)
    }
}

/// `host[:port]` with bracketed IPv6 support. `None` when the port is not a
/// non-zero `u16`.
fn split_authority(authority: &str) -> Option<(&str, Option<u16>)> {
    let (host, port) = if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => {
                let (host, rest) = authority.split_at(end + 1);
                match rest.strip_prefix(':') {
                    Some(port) => (host, Some(port)),
                    None if rest.is_empty() => (host, None),
                    None => return None,
                }
            }
            None => (authority, None),
        }
    } else {
        match authority.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (authority, None),
        }
    };

    match port {
        Some(port) => match port.parse::<u16>() {
            Ok(port) if port != 0 => Some((host, Some(port))),
            _ => None,
        },
        None => Some((host, None)),
    }
}

fn is_valid_host(host: &str) -> bool {
    if let Some(inner) = host.strip_prefix('[') {
        return inner.strip_suffix(']').is_some_and(|ip| {
            !ip.is_empty()
                && ip
                    .chars()
                    .all(|c| c.is_ascii_hexdigit() || matches!(c, ':' | '.'))
        });
    }
    host.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

/// Ordered allowlist parsed from the configured server name string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerNameList {
    entries: Vec<ServerNameEntry>,
}

impl ServerNameList {
    /// Split on whitespace and commas; malformed candidates are logged and
    /// skipped.
    pub fn parse(raw: &str) -> Self {
        let entries = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|candidate| !candidate.is_empty())
            .filter_map(|candidate| match ServerNameEntry::parse(candidate) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping allowed server name: {}", e);
                    None
                }
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[ServerNameEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose host equals `host`, ignoring ASCII case
    pub fn find(&self, host: &str) -> Option<&ServerNameEntry> {
        self.entries.iter().find(|entry| entry.matches_host(host))
    }

    /// Origin for `request`.
    ///
    /// A matching entry's explicit scheme and port override the request's.
    /// Without a match the request's own scheme, host and port are used.
    pub fn resolve<R: ServiceRequest + ?Sized>(&self, request: &R) -> Origin {
        let host = comparison_host(request);
        let request_scheme = Scheme::of_request(request);

        match self.find(host) {
            Some(entry) => Origin::new(
                entry.scheme.unwrap_or(request_scheme),
                entry.host.clone(),
                entry.port.unwrap_or(request.server_port()),
            )
            .with_path_prefix(entry.path.clone()),
            None => {
                tracing::debug!(
                    host,
                    candidates = self.entries.len(),
                    "No allowed server name matched; using request origin"
                );
                Origin::new(request_scheme, host.to_string(), request.server_port())
            }
        }
    }
}

impl FromStr for ServerNameList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Parse `server_names` and resolve the origin for `request` in one step
pub fn resolve_origin<R: ServiceRequest + ?Sized>(server_names: &str, request: &R) -> Origin {
    ServerNameList::parse(server_names).resolve(request)
}

/// Canonical `scheme://host[:port]`, plus the path prefix of the matched entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    scheme: Scheme,
    host: String,
    port: Option<u16>,
    path_prefix: String,
}

impl Origin {
    /// The port is dropped when it is the scheme's default (or zero)
    pub fn new(scheme: Scheme, host: impl Into<String>, port: u16) -> Self {
        let port = (port != 0 && port != scheme.default_port()).then_some(port);
        Self {
            scheme,
            host: host.into(),
            port,
            path_prefix: String::new(),
        }
    }

    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Non-default port, if any
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        Ok(())
    }
}
