//! Configuration integration for caskit-rs

use std::sync::Arc;

use caskit_rs_config::{
    ClientConfig, ConfigError, ConfigurationResolver, InitParameters, Result, keys,
};

use crate::{
    protocol::{Protocol, ProtocolParameterNames},
    request::{ResponseUrlEncoder, ServiceRequest},
    service_url::ServiceUrlBuilder,
};

impl ServiceUrlBuilder {
    /// Builder for a validated configuration snapshot.
    ///
    /// The protocol name is checked here against [`Protocol`]; the
    /// configuration crate validates everything else. Explicit parameter
    /// names override the protocol's own.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let protocol: Protocol = config.protocol.parse().map_err(|_| ConfigError::InvalidValue {
            field: keys::PROTOCOL.name().to_string(),
            value: config.protocol.clone(),
        })?;

        let names = ProtocolParameterNames::new(
            config
                .service_parameter_name
                .as_deref()
                .unwrap_or(protocol.service_parameter_name()),
            config
                .artifact_parameter_name
                .as_deref()
                .unwrap_or(protocol.artifact_parameter_name()),
        );

        let mut builder = ServiceUrlBuilder::new(config.server_name.as_deref().unwrap_or(""), names)
            .with_encode(config.encode_service_url);
        if let Some(service) = config.service.as_deref() {
            builder = builder.with_service(service);
        }

        Ok(builder)
    }
}

/// Startup entry point for an embedding component.
///
/// `initialize` loads and validates configuration once; afterwards the
/// component is immutable and can be shared between request handlers.
#[derive(Debug, Clone)]
pub struct ServiceUrlComponent {
    scope: String,
    config: Arc<ClientConfig>,
    builder: Arc<ServiceUrlBuilder>,
}

impl ServiceUrlComponent {
    /// Load configuration for `scope` from the default location chain
    pub fn initialize(scope: &str, params: &dyn InitParameters) -> Result<Self> {
        Self::initialize_with(ConfigurationResolver::new(scope), params)
    }

    /// Load through a prepared resolver, e.g. one with another default location
    pub fn initialize_with(
        resolver: ConfigurationResolver,
        params: &dyn InitParameters,
    ) -> Result<Self> {
        resolver.initialize(params)?;
        let component = Self::from_resolver(&resolver)?;
        resolver.shutdown();
        Ok(component)
    }

    /// Snapshot an already initialized resolver
    pub fn from_resolver(resolver: &ConfigurationResolver) -> Result<Self> {
        let config = ClientConfig::resolve(resolver)?;
        let builder = ServiceUrlBuilder::from_config(&config)?;

        tracing::info!(
            scope = resolver.scope(),
            server_names = builder.server_names().len(),
            fixed_service = builder.service().is_some(),
            "Service URL component initialized"
        );

        Ok(Self {
            scope: resolver.scope().to_string(),
            config: Arc::new(config),
            builder: Arc::new(builder),
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn builder(&self) -> &ServiceUrlBuilder {
        &self.builder
    }

    /// Service URL for one request
    pub fn service_url<R, E>(&self, request: &R, response: &E) -> String
    where
        R: ServiceRequest + ?Sized,
        E: ResponseUrlEncoder + ?Sized,
    {
        self.builder.build(request, response)
    }

    pub fn shutdown(self) {
        tracing::debug!(scope = %self.scope, "Service URL component shut down");
    }
}
