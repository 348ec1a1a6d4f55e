//! Terminal rendering of chat messages.
//!
//! Content is printed verbatim; markup inside messages is left alone.

use chrono::Local;
use colored::Colorize;
use twin_core::types::{Message, StoredMessage};

/// Header line for a message, e.g. `you · 14:02:11`.
pub fn header(role: &str, time: Option<&str>) -> String {
    let label = match role {
        "user" => "you".blue().bold(),
        "assistant" => "twin".green().bold(),
        other => other.normal().bold(),
    };
    match time {
        Some(t) => format!("{} {}", label, format!("· {}", t).dimmed()),
        None => label.to_string(),
    }
}

pub fn print_message(message: &Message) {
    let time = message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M:%S")
        .to_string();
    println!("{}", header(&message.role.to_string(), Some(&time)));
    println!("{}", message.content);
    println!();
}

pub fn print_stored(message: &StoredMessage) {
    println!("{}", header(&message.role, message.timestamp.as_deref()));
    println!("{}", message.content);
    println!();
}
