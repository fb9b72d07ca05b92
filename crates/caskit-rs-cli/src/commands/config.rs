use std::path::PathBuf;

use anyhow::{Context, Result};
use caskit_rs::ServiceUrlBuilder;
use caskit_rs_config::{
    ClientConfig, ConfigurationResolver, InitConfig,
    keys::ALL_KEY_NAMES,
    loader::{CONFIGURATION_FILE_LOCATION, DEFAULT_CONFIGURATION_FILE_LOCATION},
};
use clap::{Args, ValueEnum};
use colored::Colorize;

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Yaml,
    Json,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Properties file named by the component's own init parameter
    #[arg(long)]
    component_file: Option<PathBuf>,

    /// Properties file named by the shared context init parameter
    #[arg(long)]
    context_file: Option<PathBuf>,

    /// Location tried when neither parameter names a file
    #[arg(long, default_value = DEFAULT_CONFIGURATION_FILE_LOCATION)]
    default_location: PathBuf,

    /// Embedding component type name used for scoped keys
    #[arg(long, default_value = "AuthenticationFilter")]
    scope: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show raw values of every known key
    #[arg(short, long)]
    verbose: bool,
}

pub fn execute(args: ConfigArgs) -> Result<()> {
    let mut params = InitConfig::new();
    if let Some(path) = &args.component_file {
        params = params.with_component_parameter(CONFIGURATION_FILE_LOCATION, path.display().to_string());
    }
    if let Some(path) = &args.context_file {
        params = params.with_context_parameter(CONFIGURATION_FILE_LOCATION, path.display().to_string());
    }

    let resolver =
        ConfigurationResolver::new(&args.scope).with_default_location(&args.default_location);
    let loaded = resolver
        .initialize(&params)
        .context("Failed to load CAS client configuration")?;

    let config = ClientConfig::resolve(&resolver).context("Configuration validation failed")?;
    let builder =
        ServiceUrlBuilder::from_config(&config).context("Configuration validation failed")?;

    match args.format {
        OutputFormat::Yaml => print!("{}", config.to_yaml()?),
        OutputFormat::Json => println!("{}", config.to_json()?),
        OutputFormat::Text => {
            println!("{}", "Resolving configuration...".blue().bold());
            println!("  Scope: {}", resolver.scope());
            println!("  Source: {:?}", loaded.source());
            println!("  File: {}", loaded.path().display());
            println!("  {} Loaded {} entries", "✓".green(), loaded.store().len());

            println!("\n{}", "Client Configuration:".cyan().bold());
            println!(
                "  Server names: {}",
                config.server_name.as_deref().unwrap_or("-")
            );
            println!("  Service: {}", config.service.as_deref().unwrap_or("-"));
            println!("  Protocol: {}", config.protocol);
            println!("  Encode service URL: {}", config.encode_service_url);

            let names = builder.parameter_names();
            println!(
                "  Reserved parameters: {}, {}",
                names.service().join(", "),
                names.artifact()
            );

            for entry in builder.server_names().entries() {
                println!("    • {}", entry.host().green());
            }

            if args.verbose {
                println!("\n{}", "Raw values:".cyan().bold());
                for key in ALL_KEY_NAMES {
                    let value = loaded.store().get_scoped(resolver.scope(), key);
                    println!("  {}: {}", key, value.unwrap_or("-"));
                }
            }

            println!("\n{}", "Configuration is valid!".green().bold());
        }
    }

    Ok(())
}
