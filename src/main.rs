//! device-flow CLI binary entry point.

use device_flow::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose {
        "device_flow=debug"
    } else {
        "device_flow=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Login(args) => device_flow::cli::login::handle_login(config_path, args).await,
        Commands::Config => device_flow::cli::login::handle_config(config_path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
