use anyhow::{Context, Result};
use caskit_rs::{
    PassthroughEncoder, Protocol, ProtocolParameterNames, RequestParts, ServiceUrlBuilder,
    request::X_FORWARDED_HOST,
};
use clap::Args;

#[derive(Args)]
pub struct ServiceUrlArgs {
    /// Allowed server names, whitespace or comma separated
    #[arg(short = 's', long, default_value = "")]
    server_name: String,

    /// Fixed service URL; printed as is
    #[arg(long)]
    service: Option<String>,

    /// Request path
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Raw query string, without the leading '?'
    #[arg(short, long)]
    query: Option<String>,

    /// Request scheme
    #[arg(long, default_value = "http")]
    scheme: String,

    /// Mark the request as received over TLS
    #[arg(long)]
    secure: bool,

    /// Host header
    #[arg(long)]
    host: Option<String>,

    /// X-Forwarded-Host header
    #[arg(long)]
    forwarded_host: Option<String>,

    /// Name of the server that received the request
    #[arg(long, default_value = "localhost")]
    local_name: String,

    /// Port the request was received on
    #[arg(long, default_value_t = 80)]
    port: u16,

    /// Protocol variant (cas1, cas2, cas3, saml11)
    #[arg(long, default_value = "cas3")]
    protocol: String,

    /// Override the service parameter name (comma separated list allowed)
    #[arg(long)]
    service_param: Option<String>,

    /// Override the artifact parameter name
    #[arg(long)]
    artifact_param: Option<String>,

    /// Re-encode surviving query values
    #[arg(long)]
    encode: bool,

    /// Percent-decode the query before filtering
    #[arg(long)]
    decode: bool,
}

pub fn execute(args: ServiceUrlArgs) -> Result<()> {
    let protocol: Protocol = args
        .protocol
        .parse()
        .with_context(|| format!("Invalid --protocol: {}", args.protocol))?;

    let names = ProtocolParameterNames::new(
        args.service_param
            .as_deref()
            .unwrap_or(protocol.service_parameter_name()),
        args.artifact_param
            .as_deref()
            .unwrap_or(protocol.artifact_parameter_name()),
    );

    let mut request = RequestParts::new(args.path)
        .with_scheme(args.scheme)
        .with_server_name(args.local_name)
        .with_server_port(args.port);
    if args.secure {
        request = request.with_secure(true);
    }
    if let Some(host) = args.host {
        request = request.with_host(host);
    }
    if let Some(forwarded) = args.forwarded_host {
        request = request.with_header(X_FORWARDED_HOST, forwarded);
    }
    if let Some(query) = args.query {
        request = request.with_query(query);
    }

    let mut builder = ServiceUrlBuilder::new(&args.server_name, names)
        .with_encode(args.encode)
        .with_decode(args.decode);
    if let Some(service) = args.service {
        builder = builder.with_service(service);
    }

    tracing::debug!(
        allowed = builder.server_names().len(),
        protocol = %protocol,
        "Computing service URL"
    );

    println!("{}", builder.build(&request, &PassthroughEncoder));
    Ok(())
}
