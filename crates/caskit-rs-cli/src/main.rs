use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{config, service_url};

#[derive(Parser)]
#[command(name = "caskit")]
#[command(version)]
#[command(about = "caskit-rs CLI - CAS service URL and configuration tooling", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CASKIT_LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the service URL for a request
    ServiceUrl(service_url::ServiceUrlArgs),

    /// Resolve and validate client configuration
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    colored::control::set_override(!cli.no_color);

    match cli.command {
        Commands::ServiceUrl(args) => service_url::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
