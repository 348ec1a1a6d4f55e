//! Configuration commands.

use anyhow::{Result, bail};
use colored::Colorize;

use crate::cli::{ConfigAction, ConfigCommand};
use crate::config::Config;

pub async fn execute(cmd: ConfigCommand, config: &Config) -> Result<()> {
    match cmd.action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init(config, force),
    }
}

fn init(config: &Config, force: bool) -> Result<()> {
    let path = Config::config_path();
    if path.exists() && !force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    config.save(&path)?;
    println!("{} {}", "✓ Wrote".green(), path.display());
    Ok(())
}
