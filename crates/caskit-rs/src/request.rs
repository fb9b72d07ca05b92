//! Read-only view of the inbound request and the response URL hook

/// Header consulted first when a reverse proxy rewrote the host
pub const X_FORWARDED_HOST: &str = "X-Forwarded-Host";

/// Request fields the service URL is built from.
///
/// Implemented by the embedding HTTP adapter; the library never mutates the
/// request.
pub trait ServiceRequest {
    /// Scheme the request arrived with (`http`, `https`)
    fn scheme(&self) -> &str;

    /// Whether the request arrived over a secure channel
    fn is_secure(&self) -> bool;

    /// Case-insensitive header lookup
    fn header(&self, name: &str) -> Option<&str>;

    /// Name of the server that received the request
    fn server_name(&self) -> &str;

    /// Port the request was received on
    fn server_port(&self) -> u16;

    /// Request path, without the query string
    fn path(&self) -> &str;

    /// Raw query string, without the leading `?`
    fn query_string(&self) -> Option<&str>;
}

/// Hook applied to the final URL when encoding is requested.
///
/// Containers that track sessions through URL rewriting append the session
/// identifier here.
pub trait ResponseUrlEncoder {
    fn encode_url(&self, url: &str) -> String;
}

/// [`ResponseUrlEncoder`] that leaves URLs untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughEncoder;

impl ResponseUrlEncoder for PassthroughEncoder {
    fn encode_url(&self, url: &str) -> String {
        url.to_string()
    }
}

impl<F> ResponseUrlEncoder for F
where
    F: Fn(&str) -> String,
{
    fn encode_url(&self, url: &str) -> String {
        self(url)
    }
}

/// Owned request snapshot, for adapters and tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParts {
    pub scheme: String,
    pub secure: bool,
    pub headers: Vec<(String, String)>,
    pub server_name: String,
    pub server_port: u16,
    pub path: String,
    pub query: Option<String>,
}

impl Default for RequestParts {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            secure: false,
            headers: Vec::new(),
            server_name: "localhost".to_string(),
            server_port: 80,
            path: "/".to_string(),
            query: None,
        }
    }
}

impl RequestParts {
    /// `GET`-style request for `path` on localhost:80
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Sets the scheme; `https` also marks the request secure
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self.secure = self.scheme.eq_ignore_ascii_case("https");
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_host(self, host: impl Into<String>) -> Self {
        self.with_header("Host", host)
    }

    pub fn with_server_name(mut self, server_name: impl Into<String>) -> Self {
        self.server_name = server_name.into();
        self
    }

    pub fn with_server_port(mut self, port: u16) -> Self {
        self.server_port = port;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Build from `http` request parts.
    ///
    /// The URI rarely carries scheme and authority on the server side, so
    /// the local port and secure flag come from the listener.
    #[cfg(feature = "http")]
    #[cfg_attr(docsrs, doc(cfg(feature = "http")))]
    pub fn from_http_parts(parts: &http::request::Parts, server_port: u16, secure: bool) -> Self {
        let scheme = match parts.uri.scheme_str() {
            Some(scheme) => scheme.to_string(),
            None if secure => "https".to_string(),
            None => "http".to_string(),
        };

        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            scheme,
            secure,
            headers,
            server_name: parts.uri.host().unwrap_or("localhost").to_string(),
            server_port,
            path: parts.uri.path().to_string(),
            query: parts.uri.query().map(str::to_string),
        }
    }
}

impl ServiceRequest for RequestParts {
    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn server_name(&self) -> &str {
        &self.server_name
    }

    fn server_port(&self) -> u16 {
        self.server_port
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

/// Host the allowlist is compared against: forwarded host, `Host` header,
/// then the server name. Any port suffix is removed.
pub fn comparison_host<R: ServiceRequest + ?Sized>(request: &R) -> &str {
    let forwarded = request
        .header(X_FORWARDED_HOST)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let host = forwarded
        .or_else(|| request.header("Host").map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or_else(|| request.server_name());

    strip_port(host)
}

/// `host:port` -> `host`; bracketed IPv6 literals keep their brackets
pub(crate) fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        Some((bare, port)) if !bare.contains(':') && port.bytes().all(|b| b.is_ascii_digit()) => {
            bare
        }
        _ => host,
    }
}
