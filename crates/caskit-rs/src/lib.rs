#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
//! Service URL construction for CAS single sign-on clients.
//!
//! Given the inbound request and an allowlist of server names, rebuild the
//! absolute URL the CAS server should return the browser to, minus the
//! protocol's own `service`/`ticket` (or `TARGET`/`SAMLart`) parameters.
//!
//! ```
//! use caskit_rs::{PassthroughEncoder, RequestParts, construct_service_url};
//!
//! let request = RequestParts::new("/hello/hithere/")
//!     .with_scheme("https")
//!     .with_server_port(443)
//!     .with_host("www.myserver.com")
//!     .with_query("service=this&ticket=that&custom=custom");
//!
//! let url = construct_service_url(
//!     &request,
//!     &PassthroughEncoder,
//!     None,
//!     "www.myserver.com",
//!     "service",
//!     "ticket",
//!     false,
//! );
//! assert_eq!(url, "https://www.myserver.com/hello/hithere/?custom=custom");
//! ```

pub mod protocol;
pub mod query;
pub mod request;
pub mod server_name;
pub mod service_url;

/// Building service URLs from loaded configuration
#[cfg(feature = "config")]
#[cfg_attr(docsrs, doc(cfg(feature = "config")))]
pub mod config;

#[cfg(feature = "config")]
#[cfg_attr(docsrs, doc(cfg(feature = "config")))]
pub use caskit_rs_config;
#[cfg(feature = "config")]
#[cfg_attr(docsrs, doc(cfg(feature = "config")))]
pub use config::ServiceUrlComponent;
pub use protocol::{Protocol, ProtocolParameterNames, UnknownProtocol};
pub use query::{FilterOptions, QueryParameterFilter, filter_query};
pub use request::{PassthroughEncoder, RequestParts, ResponseUrlEncoder, ServiceRequest};
pub use server_name::{Origin, Scheme, ServerNameEntry, ServerNameList, resolve_origin};
pub use service_url::{
    ServiceUrlBuilder, compose_service_url, construct_service_url,
    construct_service_url_with_default_names,
};
