//! Service URL construction against realistic requests

use caskit_rs::{
    FilterOptions, PassthroughEncoder, Protocol, RequestParts, ServiceUrlBuilder,
    construct_service_url, construct_service_url_with_default_names, filter_query,
};

use crate::init_tracing;

fn request() -> RequestParts {
    RequestParts::new("/hello/hithere/")
        .with_scheme("https")
        .with_secure(true)
        .with_server_port(443)
        .with_host("www.myserver.com")
}

fn cas3(request: &RequestParts, server_names: &str, encode: bool) -> String {
    construct_service_url(
        request,
        &PassthroughEncoder,
        None,
        server_names,
        Protocol::Cas3.service_parameter_name(),
        Protocol::Cas3.artifact_parameter_name(),
        encode,
    )
}

fn saml(request: &RequestParts, encode: bool) -> String {
    construct_service_url(
        request,
        &PassthroughEncoder,
        None,
        "www.myserver.com",
        Protocol::Saml11.service_parameter_name(),
        Protocol::Saml11.artifact_parameter_name(),
        encode,
    )
}

#[test]
fn test_construct_service_url_with_trailing_slash() {
    init_tracing();
    assert_eq!(
        cas3(&request(), "www.myserver.com", false),
        "https://www.myserver.com/hello/hithere/"
    );
}

#[test]
fn test_server_name_containing_path() {
    let request = request().with_host("www.my.server.com");
    assert_eq!(
        cas3(&request, "www.my.server.com/app", false),
        "https://www.my.server.com/app/hello/hithere/"
    );
    assert_eq!(
        cas3(&request, "https://www.my.server.com/app", false),
        "https://www.my.server.com/app/hello/hithere/"
    );
}

#[test]
fn test_params_cas() {
    let request = request().with_query("service=this&ticket=that&custom=custom");
    assert_eq!(
        cas3(&request, "www.myserver.com", false),
        "https://www.myserver.com/hello/hithere/?custom=custom"
    );
    assert_eq!(
        cas3(&request, "https://www.myserver.com", false),
        "https://www.myserver.com/hello/hithere/?custom=custom"
    );
}

#[test]
fn test_params_saml() {
    let request = request().with_query("TARGET=this&SAMLart=that&custom=custom");
    assert_eq!(
        saml(&request, false),
        "https://www.myserver.com/hello/hithere/?custom=custom"
    );
}

#[test]
fn test_encoded_params_saml() {
    let request = request().with_query("TARGET%3Dthis%26SAMLart%3Dthat%26custom%3Dcustom");
    assert_eq!(
        saml(&request, false),
        "https://www.myserver.com/hello/hithere/?custom=custom"
    );

    let request = self::request().with_query(
        "TARGET%3Dthis%26SAMLart%3Dthat%26custom%3Dcustom%20value%20here%26another%3Dgood",
    );
    assert_eq!(
        saml(&request, true),
        "https://www.myserver.com/hello/hithere/?custom=custom+value+here&another=good"
    );
}

#[test]
fn test_saml_values_without_encoding() {
    let request =
        request().with_query("TARGET=this&SAMLart=that&custom=custom value here&another=good");
    assert_eq!(
        saml(&request, false),
        "https://www.myserver.com/hello/hithere/?custom=custom value here&another=good"
    );

    let request =
        self::request().with_query("TARGET=this&SAMLart=that&custom=custom+value+here&another=good");
    assert_eq!(
        saml(&request, true),
        "https://www.myserver.com/hello/hithere/?custom=custom+value+here&another=good"
    );
}

#[test]
fn test_no_service_parameters_passed() {
    let request = request().with_query("TARGET=Test1&service=Test2&custom=custom");
    let url = construct_service_url_with_default_names(
        &request,
        &PassthroughEncoder,
        None,
        "www.myserver.com",
        Protocol::Saml11.artifact_parameter_name(),
        true,
    );
    assert_eq!(url, "https://www.myserver.com/hello/hithere/?custom=custom");
}

#[test]
fn test_non_standard_port_without_port_in_config() {
    let request = request().with_server_port(555);
    for server_names in ["www.myserver.com", "https://www.myserver.com"] {
        assert_eq!(
            cas3(&request, server_names, false),
            "https://www.myserver.com:555/hello/hithere/"
        );
    }
}

#[test]
fn test_multiple_hosts_without_ports_or_scheme() {
    assert_eq!(
        cas3(&request(), "www.amazon.com www.bestbuy.com www.myserver.com", false),
        "https://www.myserver.com/hello/hithere/"
    );
}

#[test]
fn test_multiple_hosts_with_schemes() {
    assert_eq!(
        cas3(
            &request(),
            "http://www.amazon.com https://www.bestbuy.com https://www.myserver.com",
            false
        ),
        "https://www.myserver.com/hello/hithere/"
    );
}

/// The request host matches the allowlist entry here. Without a match the
/// request's own origin is used rather than the configured entry, even for a
/// single-entry list (see `test_single_entry_does_not_override_request_host`).
#[test]
fn test_query_with_embedded_url_kept_verbatim() {
    let request = RequestParts::new("/idp/authN/ExtCas")
        .with_scheme("https")
        .with_server_port(443)
        .with_host("my.server.com")
        .with_query("conversation=e1s1&ticket=ST-1234-123456789-a&entityId=https://test.edu/sp?alias=1234-1234-1234-1234&something=else");
    assert_eq!(
        cas3(&request, "https://my.server.com", false),
        "https://my.server.com/idp/authN/ExtCas?conversation=e1s1&entityId=https://test.edu/sp?alias=1234-1234-1234-1234&something=else"
    );
}

#[test]
fn test_single_entry_does_not_override_request_host() {
    let request = RequestParts::new("/idp/authN/ExtCas")
        .with_scheme("https")
        .with_server_port(443)
        .with_host("other.server.com")
        .with_query("conversation=e1s1&ticket=ST-1");
    assert_eq!(
        cas3(&request, "https://my.server.com", false),
        "https://other.server.com/idp/authN/ExtCas?conversation=e1s1"
    );
}

#[test]
fn test_forged_host_falls_back_to_request_origin() {
    let request = request().with_host("evil.example.com");
    assert_eq!(
        cas3(&request, "www.amazon.com www.myserver.com", false),
        "https://evil.example.com/hello/hithere/"
    );
}

#[test]
fn test_forwarded_host_behind_proxy() {
    let request = RequestParts::new("/app/")
        .with_server_port(8080)
        .with_host("10.0.0.7:8080")
        .with_header("X-Forwarded-Host", "www.myserver.com");
    assert_eq!(
        cas3(&request, "backend.local https://www.myserver.com:443", false),
        "https://www.myserver.com/app/"
    );
}

#[test]
fn test_filtered_url_has_no_reserved_names_and_keeps_order() {
    let query = "a=1&service=s&b=2&ticket=t&c=3&service=again&d=4";
    let url = cas3(&request().with_query(query), "www.myserver.com", false);
    let (_, built_query) = url.split_once('?').unwrap();

    assert_eq!(built_query, "a=1&b=2&c=3&d=4");
    assert_eq!(
        filter_query(
            built_query,
            &Protocol::Cas3.parameter_names(),
            FilterOptions::default()
        ),
        built_query
    );
}

#[test]
fn test_builder_shared_across_threads() {
    let builder = std::sync::Arc::new(ServiceUrlBuilder::new(
        "www.a.com www.b.com",
        Protocol::Cas2.parameter_names(),
    ));

    let handles: Vec<_> = ["www.a.com", "www.b.com", "WWW.A.COM"]
        .into_iter()
        .map(|host| {
            let builder = builder.clone();
            std::thread::spawn(move || {
                let request = RequestParts::new("/x")
                    .with_host(host)
                    .with_query("ticket=ST-1&keep=yes");
                builder.build(&request, &PassthroughEncoder)
            })
        })
        .collect();

    let urls: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        urls,
        [
            "http://www.a.com/x?keep=yes",
            "http://www.b.com/x?keep=yes",
            "http://www.a.com/x?keep=yes",
        ]
    );
}

#[test]
fn test_from_http_parts() {
    let (parts, _) = http::Request::builder()
        .uri("/hello/hithere/?service=this&custom=custom")
        .header("host", "www.myserver.com")
        .body(())
        .unwrap()
        .into_parts();

    let request = RequestParts::from_http_parts(&parts, 443, true);
    assert_eq!(request.scheme, "https");
    assert_eq!(
        cas3(&request, "www.myserver.com", false),
        "https://www.myserver.com/hello/hithere/?custom=custom"
    );
}
