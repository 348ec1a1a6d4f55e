//! Diagnostics command.

use anyhow::Result;
use colored::Colorize;

use twin_core::client::ChatClient;

use crate::config::Config;

pub async fn execute(config: &Config) -> Result<()> {
    println!("{}", "twin Doctor".cyan().bold());
    println!("{}", "─".repeat(50));
    println!();

    let mut issues = Vec::new();

    // Check config file
    print!("  Config file: ");
    let config_path = Config::config_path();
    if config_path.exists() {
        println!("{}", "✓ exists".green());
    } else {
        println!("{}", "○ not found (using defaults)".yellow());
    }

    // Check identity
    print!("  Email: ");
    match config.chat.email.as_deref() {
        Some(email) => match twin_core::session::validate_identity(email) {
            Ok(()) => println!("{}", format!("✓ {}", email).green()),
            Err(e) => {
                println!("{}", format!("✗ {}", e).red());
                issues.push("Configured email is not valid");
            }
        },
        None => println!("{}", "○ not set (prompted at start)".yellow()),
    }

    // Idle settings
    println!(
        "  Idle shutdown: {} (checked every {}s)",
        format!("{}s", config.idle.timeout_secs).cyan(),
        config.idle.check_secs
    );

    // Check API connectivity
    print!("  API ({}):", config.base_url());
    match ChatClient::with_timeout(config.base_url(), config.request_timeout()) {
        Ok(client) => match client.health().await {
            Ok(health) => {
                println!(" {}", format!("✓ {}", health.status).green());
                if let Some(use_s3) = health.use_s3 {
                    let store = if use_s3 { "s3" } else { "local" };
                    println!("    memory store: {}", store);
                }
            }
            Err(e) => {
                println!(" {}", format!("✗ {}", e).red());
                issues.push("Cannot reach the chat service");
            }
        },
        Err(e) => {
            println!(" {}", format!("✗ {}", e).red());
            issues.push("Failed to create HTTP client");
        }
    }

    // Summary
    println!();
    if issues.is_empty() {
        println!("{}", "✓ All checks passed".green().bold());
    } else {
        println!("{}", format!("✗ {} issue(s) found:", issues.len()).red().bold());
        for issue in &issues {
            println!("  • {}", issue);
        }
    }

    Ok(())
}
