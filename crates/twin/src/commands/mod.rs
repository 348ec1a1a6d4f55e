//! Command implementations for the twin CLI.
//!
//! Each submodule implements the logic for one subcommand.

pub mod chat;
pub mod config;
pub mod doctor;
pub mod transcript;
