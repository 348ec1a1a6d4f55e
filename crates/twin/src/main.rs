//! twin - terminal client for the twin-chat service
//!
//! Email-gated chat sessions that are closed on exit, on interrupt, or
//! after a long stretch without activity.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod config;
mod error;
mod render;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout belongs to the conversation.
    let level = if cli.verbose { "twin=info" } else { "twin=warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(level.parse()?))
        .init();

    // Load configuration
    let mut config = config::Config::load()?;
    if let Some(url) = cli.api_url {
        config.api.url = url;
    }

    // Execute command
    match cli.command {
        None => commands::chat::execute(None, &config).await,
        Some(Commands::Chat { email }) => commands::chat::execute(email, &config).await,
        Some(Commands::Transcript { session_id, json }) => {
            commands::transcript::execute(&session_id, json, &config).await
        }
        Some(Commands::Doctor) => commands::doctor::execute(&config).await,
        Some(Commands::Config(cmd)) => commands::config::execute(cmd, &config).await,
        Some(Commands::Version) => {
            println!("twin {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
