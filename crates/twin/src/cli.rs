//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// twin-chat terminal client
///
/// Talk to the chat service from a terminal. Sessions start once you give
/// your email and are closed on exit, on Ctrl-C, or after an hour idle.
#[derive(Parser, Debug)]
#[command(name = "twin")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Chat service base URL (overrides config and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log at info level instead of warnings only
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session (default)
    Chat {
        /// Email to identify with; prompted for when omitted
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Print the stored transcript of a session
    Transcript {
        /// Session ID (the email for sessions without a server-assigned ID)
        session_id: String,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Check configuration and service reachability
    Doctor,

    /// Configuration management
    Config(ConfigCommand),

    /// Show version
    Version,
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
