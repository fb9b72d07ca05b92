//! Service URL construction
//!
//! The service URL is where the CAS server sends the browser back to after
//! login. It is rebuilt from the request: an allowlisted origin, the request
//! path verbatim, and the query minus the protocol's own parameters.

use crate::{
    protocol::ProtocolParameterNames,
    query::{FilterOptions, QueryParameterFilter},
    request::{ResponseUrlEncoder, ServiceRequest},
    server_name::{Origin, ServerNameList},
};

/// Immutable per-deployment settings; cheap to share across request threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceUrlBuilder {
    service: Option<String>,
    server_names: ServerNameList,
    filter: QueryParameterFilter,
    encode: bool,
}

impl ServiceUrlBuilder {
    pub fn new(server_names: &str, names: ProtocolParameterNames) -> Self {
        Self {
            service: None,
            server_names: ServerNameList::parse(server_names),
            filter: QueryParameterFilter::new(names, FilterOptions::default()),
            encode: false,
        }
    }

    /// Fixed service URL, returned verbatim for every request
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        let service = service.into();
        self.service = (!service.trim().is_empty()).then_some(service);
        self
    }

    /// Re-encode surviving query values and run the response URL hook
    pub fn with_encode(mut self, encode: bool) -> Self {
        self.encode = encode;
        self.filter = QueryParameterFilter::new(
            self.filter.names().clone(),
            FilterOptions {
                encode,
                ..self.filter.options()
            },
        );
        self
    }

    /// Always percent-decode the query before filtering
    pub fn with_decode(mut self, decode: bool) -> Self {
        self.filter = QueryParameterFilter::new(
            self.filter.names().clone(),
            FilterOptions {
                decode,
                ..self.filter.options()
            },
        );
        self
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn server_names(&self) -> &ServerNameList {
        &self.server_names
    }

    pub fn parameter_names(&self) -> &ProtocolParameterNames {
        self.filter.names()
    }

    pub fn encode(&self) -> bool {
        self.encode
    }

    /// Service URL for `request`
    pub fn build<R, E>(&self, request: &R, response: &E) -> String
    where
        R: ServiceRequest + ?Sized,
        E: ResponseUrlEncoder + ?Sized,
    {
        if let Some(service) = self.service.as_deref() {
            return service.to_string();
        }

        let origin = self.server_names.resolve(request);
        let query = request
            .query_string()
            .map(|q| self.filter.filter(q))
            .unwrap_or_default();

        let url = compose_service_url(&origin, request.path(), &query);
        tracing::debug!(service_url = %url, "Constructed service URL");

        if self.encode {
            response.encode_url(&url)
        } else {
            url
        }
    }
}

/// `origin + path prefix + path`, then `?query` when the query is non-empty
pub fn compose_service_url(origin: &Origin, path: &str, query: &str) -> String {
    let mut url = format!("{}{}{}", origin, origin.path_prefix(), path);
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    url
}

/// Build the service URL for one request.
///
/// An explicit `service` is returned as is. Otherwise the origin comes from
/// the `server_names` allowlist and `service_parameter_name` (comma separated
/// list allowed) plus `artifact_parameter_name` are stripped from the query.
pub fn construct_service_url<R, E>(
    request: &R,
    response: &E,
    service: Option<&str>,
    server_names: &str,
    service_parameter_name: &str,
    artifact_parameter_name: &str,
    encode: bool,
) -> String
where
    R: ServiceRequest + ?Sized,
    E: ResponseUrlEncoder + ?Sized,
{
    if let Some(service) = service.filter(|s| !s.trim().is_empty()) {
        return service.to_string();
    }

    ServiceUrlBuilder::new(
        server_names,
        ProtocolParameterNames::new(service_parameter_name, artifact_parameter_name),
    )
    .with_encode(encode)
    .build(request, response)
}

/// [`construct_service_url`] reserving the default service parameter names
/// (`service` and `TARGET`)
pub fn construct_service_url_with_default_names<R, E>(
    request: &R,
    response: &E,
    service: Option<&str>,
    server_names: &str,
    artifact_parameter_name: &str,
    encode: bool,
) -> String
where
    R: ServiceRequest + ?Sized,
    E: ResponseUrlEncoder + ?Sized,
{
    construct_service_url(
        request,
        response,
        service,
        server_names,
        crate::protocol::DEFAULT_SERVICE_PARAMETER_NAMES,
        artifact_parameter_name,
        encode,
    )
}
