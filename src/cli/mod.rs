//! CLI entry point for the device-flow simulator.

pub mod login;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::FlowConfig;

/// OAuth 2.0 device authorization grant client
#[derive(Parser, Debug)]
#[command(name = "device-flow", version, about = "OAuth 2.0 device authorization grant client")]
pub struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the device flow until it is authorized, denied or failed
    Login(LoginArgs),
    /// Print the effective configuration
    Config,
}

/// Arguments for `device-flow login`; each overrides the resolved config.
#[derive(Parser, Debug, Default)]
pub struct LoginArgs {
    /// Authorization server base URL
    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub client_id: Option<String>,

    #[arg(long)]
    pub client_secret: Option<String>,

    /// Polling interval in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Disable automatic polling; press Enter to check for a token
    #[arg(long)]
    pub no_polling: bool,
}

impl LoginArgs {
    pub fn apply(&self, config: &mut FlowConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(id) = &self.client_id {
            config.client_id = id.clone();
        }
        if let Some(secret) = &self.client_secret {
            config.client_secret = secret.clone();
        }
        if let Some(secs) = self.interval {
            config.polling_interval_secs = secs;
        }
        if self.no_polling {
            config.polling_enabled = false;
        }
    }
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
