//! Startup configuration feeding the service URL builder

use std::{fs, path::PathBuf};

use caskit_rs::{
    PassthroughEncoder, RequestParts, ServiceUrlComponent,
    caskit_rs_config::{
        ConfigError, ConfigurationResolver, ConfigurationSource, InitConfig,
        loader::CONFIGURATION_FILE_LOCATION,
    },
};
use tempfile::TempDir;

use crate::init_tracing;

fn write_properties(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn missing_default(dir: &TempDir) -> PathBuf {
    dir.path().join("absent.properties")
}

/// Scoped keys win over bare ones for the filter that owns the scope
#[test]
fn test_component_uses_scoped_settings() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = write_properties(
        &dir,
        "cas.properties",
        "# shared settings\n\
         serverName=www.other.com\n\
         AuthenticationFilter.serverName=https://www.myserver.com\n\
         protocol=saml11\n\
         encodeServiceUrl=false\n",
    );

    let params = InitConfig::new()
        .with_component_parameter(CONFIGURATION_FILE_LOCATION, path.display().to_string());
    let resolver = ConfigurationResolver::new("AuthenticationFilter")
        .with_default_location(missing_default(&dir));
    let component = ServiceUrlComponent::initialize_with(resolver, &params).unwrap();

    let request = RequestParts::new("/hello/hithere/")
        .with_server_port(443)
        .with_host("www.myserver.com")
        .with_query("TARGET=this&SAMLart=that&custom=custom");
    assert_eq!(
        component.service_url(&request, &PassthroughEncoder),
        "https://www.myserver.com/hello/hithere/?custom=custom"
    );
    assert!(!component.config().encode_service_url);
}

/// A context-level file serves every component that has no file of its own
#[test]
fn test_context_parameter_shared_between_scopes() {
    let dir = TempDir::new().unwrap();
    let path = write_properties(
        &dir,
        "shared.properties",
        "serverName=www.myserver.com\n\
         Cas30ProxyReceivingTicketValidationFilter.serverName=validator.myserver.com\n",
    );
    let params = InitConfig::new()
        .with_context_parameter(CONFIGURATION_FILE_LOCATION, path.display().to_string());

    let auth = ServiceUrlComponent::initialize_with(
        ConfigurationResolver::new("AuthenticationFilter")
            .with_default_location(missing_default(&dir)),
        &params,
    )
    .unwrap();
    let validation = ServiceUrlComponent::initialize_with(
        ConfigurationResolver::new("Cas30ProxyReceivingTicketValidationFilter")
            .with_default_location(missing_default(&dir)),
        &params,
    )
    .unwrap();

    assert_eq!(auth.config().server_name.as_deref(), Some("www.myserver.com"));
    assert_eq!(
        validation.config().server_name.as_deref(),
        Some("validator.myserver.com")
    );
}

/// Falls back to the default location when no parameter names a file
#[test]
fn test_default_location_fallback() {
    let dir = TempDir::new().unwrap();
    let default = write_properties(
        &dir,
        "cas-client.properties",
        "service=https://app.example.com/login/cas\n",
    );

    let resolver =
        ConfigurationResolver::new("AuthenticationFilter").with_default_location(&default);
    let loaded = resolver.initialize(&InitConfig::new()).unwrap();
    assert_eq!(loaded.source(), ConfigurationSource::DefaultLocation);
    assert_eq!(loaded.path(), default.as_path());

    let component = ServiceUrlComponent::from_resolver(&resolver).unwrap();
    let request = RequestParts::new("/anything").with_query("ticket=ST-1");
    assert_eq!(
        component.service_url(&request, &PassthroughEncoder),
        "https://app.example.com/login/cas"
    );
}

/// Every candidate failing to load stops startup
#[test]
fn test_unloadable_configuration_is_fatal() {
    let dir = TempDir::new().unwrap();
    let params = InitConfig::new()
        .with_component_parameter(
            CONFIGURATION_FILE_LOCATION,
            dir.path().join("component.properties").display().to_string(),
        )
        .with_context_parameter(
            CONFIGURATION_FILE_LOCATION,
            dir.path().join("context.properties").display().to_string(),
        );

    let resolver = ConfigurationResolver::new("AuthenticationFilter")
        .with_default_location(missing_default(&dir));
    let err = ServiceUrlComponent::initialize_with(resolver, &params).unwrap_err();

    match err {
        ConfigError::LoadFailed { attempted } => assert_eq!(attempted.len(), 3),
        other => panic!("expected LoadFailed, got {other:?}"),
    }
}

/// A loaded file without any target setting is rejected at startup
#[test]
fn test_missing_target_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_properties(&dir, "cas.properties", "protocol=cas2\n");
    let params = InitConfig::new()
        .with_component_parameter(CONFIGURATION_FILE_LOCATION, path.display().to_string());

    let resolver = ConfigurationResolver::new("AuthenticationFilter")
        .with_default_location(missing_default(&dir));
    let err = ServiceUrlComponent::initialize_with(resolver, &params).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));
}

/// Encoding configured on routes values through the response hook
#[test]
fn test_encoding_uses_response_hook() {
    let dir = TempDir::new().unwrap();
    let path = write_properties(
        &dir,
        "cas.properties",
        "serverName=www.myserver.com\nencodeServiceUrl=yes\n",
    );
    let params = InitConfig::new()
        .with_component_parameter(CONFIGURATION_FILE_LOCATION, path.display().to_string());
    let component = ServiceUrlComponent::initialize_with(
        ConfigurationResolver::new("AuthenticationFilter")
            .with_default_location(missing_default(&dir)),
        &params,
    )
    .unwrap();

    let request = RequestParts::new("/app")
        .with_host("www.myserver.com")
        .with_query("ticket=ST-9&q=a b");
    let with_session = |url: &str| format!("{url};jsessionid=abc");

    assert_eq!(
        component.service_url(&request, &with_session),
        "http://www.myserver.com/app?q=a+b;jsessionid=abc"
    );
}
