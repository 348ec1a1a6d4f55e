//! Stored transcript lookup.

use anyhow::{Context, Result};
use colored::Colorize;

use twin_core::client::ChatClient;

use crate::config::Config;
use crate::render;

pub async fn execute(session_id: &str, json: bool, config: &Config) -> Result<()> {
    let client = ChatClient::with_timeout(config.base_url(), config.request_timeout())
        .context("Failed to create chat client")?;

    let conversation = client
        .conversation(session_id)
        .await
        .with_context(|| format!("Failed to fetch transcript for {}", session_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Session".cyan().bold(),
        conversation.session_id.bold()
    );
    println!("{}", "─".repeat(50));

    if conversation.messages.is_empty() {
        println!("{}", "No messages stored.".dimmed());
        return Ok(());
    }

    println!();
    for message in &conversation.messages {
        render::print_stored(message);
    }
    println!("{}", format!("{} message(s)", conversation.messages.len()).dimmed());

    Ok(())
}
