//! Configuration management for twin.
//!
//! Configuration is loaded from multiple sources with precedence:
//! 1. Command-line flags
//! 2. Environment variables (TWIN_*, NEXT_PUBLIC_API_URL)
//! 3. Config file (TWIN_CONFIG or <config dir>/twin/config.toml)
//! 4. Default values

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use twin_core::WidgetConfig;
use twin_core::idle::IdleConfig;
use twin_core::widget::DEFAULT_BASE_URL;

use crate::error::{TwinError, TwinResult};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Chat service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Idle shutdown settings
    #[serde(default)]
    pub idle: IdleSettings,

    /// Chat defaults
    #[serde(default)]
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the chat service
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleSettings {
    /// Inactivity before the session is closed, in seconds
    #[serde(default = "default_idle_timeout")]
    pub timeout_secs: u64,

    /// How often inactivity is checked, in seconds
    #[serde(default = "default_idle_check")]
    pub check_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatSettings {
    /// Email submitted automatically when a chat starts
    pub email: Option<String>,
}

// Default value functions
fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    60 * 60
}

fn default_idle_check() -> u64 {
    60
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for IdleSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_idle_timeout(),
            check_secs: default_idle_check(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    pub fn load() -> TwinResult<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> TwinResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject durations the chat loop and HTTP client cannot run with.
    pub fn validate(&self) -> TwinResult<()> {
        let durations = [
            ("api.request_timeout_secs", self.api.request_timeout_secs),
            ("idle.timeout_secs", self.idle.timeout_secs),
            ("idle.check_secs", self.idle.check_secs),
        ];
        for (key, secs) in durations {
            if secs == 0 {
                return Err(TwinError::Config(format!(
                    "{} must be a positive number of seconds",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Overlay environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> TwinResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TWIN_API_URL").or_else(|| lookup("NEXT_PUBLIC_API_URL")) {
            if !url.trim().is_empty() {
                self.api.url = url.trim().to_string();
            }
        }
        if let Some(v) = lookup("TWIN_REQUEST_TIMEOUT_SECS") {
            self.api.request_timeout_secs = parse_secs("TWIN_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TWIN_IDLE_TIMEOUT_SECS") {
            self.idle.timeout_secs = parse_secs("TWIN_IDLE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("TWIN_IDLE_CHECK_SECS") {
            self.idle.check_secs = parse_secs("TWIN_IDLE_CHECK_SECS", &v)?;
        }
        if let Some(email) = lookup("TWIN_EMAIL") {
            self.chat.email = Some(email);
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> TwinResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("TWIN_CONFIG") {
            PathBuf::from(path)
        } else if let Some(proj_dirs) = ProjectDirs::from("dev", "twin-chat", "twin") {
            proj_dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from(".twin").join("config.toml")
        }
    }

    pub fn base_url(&self) -> &str {
        self.api.url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs)
    }

    pub fn idle_check_interval(&self) -> Duration {
        Duration::from_secs(self.idle.check_secs)
    }

    /// Settings the chat widget is mounted with.
    pub fn widget_config(&self) -> WidgetConfig {
        WidgetConfig {
            base_url: self.base_url().to_string(),
            idle: IdleConfig {
                check_interval: self.idle_check_interval(),
                idle_threshold: Duration::from_secs(self.idle.timeout_secs),
            },
        }
    }
}

fn parse_secs(key: &str, value: &str) -> TwinResult<u64> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(TwinError::Config(format!(
            "{} must be a positive number of seconds, got {:?}",
            key, value
        ))),
        Ok(secs) => Ok(secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.api.url, "http://localhost:8000");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.idle.timeout_secs, 3600);
        assert_eq!(config.idle.check_secs, 60);
        assert!(config.chat.email.is_none());

        let widget = config.widget_config();
        assert_eq!(widget.idle, IdleConfig::default());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = tempdir().expect("Failed to create temp dir");
        let loaded = Config::load_from(&temp.path().join("nope.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[api]\nurl = \"https://twin.example.com/\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.base_url(), "https://twin.example.com");
        assert_eq!(loaded.api.request_timeout_secs, 30);
        assert_eq!(loaded.idle.timeout_secs, 3600);
    }

    #[test]
    fn test_save_and_load() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.chat.email = Some("a@b.com".into());
        config.idle.timeout_secs = 120;
        config.save(&path).expect("Failed to save config");

        let loaded = Config::load_from(&path).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp = tempdir().expect("Failed to create temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[api\nurl = ").unwrap();

        assert!(matches!(Config::load_from(&path), Err(TwinError::Config(_))));
    }

    #[test]
    fn test_zero_durations_in_file_rejected() {
        let temp = tempdir().expect("Failed to create temp dir");

        for body in [
            "[idle]\ncheck_secs = 0\n",
            "[idle]\ntimeout_secs = 0\n",
            "[api]\nrequest_timeout_secs = 0\n",
        ] {
            let path = temp.path().join("config.toml");
            std::fs::write(&path, body).unwrap();

            match Config::load_from(&path) {
                Err(TwinError::Config(msg)) => assert!(msg.contains("positive"), "{msg}"),
                other => panic!("{body:?} was accepted: {:?}", other),
            }
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.idle.check_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("NEXT_PUBLIC_API_URL", "https://public.example.com"),
                ("TWIN_IDLE_TIMEOUT_SECS", "900"),
                ("TWIN_IDLE_CHECK_SECS", "15"),
            ]))
            .unwrap();

        assert_eq!(config.api.url, "https://public.example.com");
        let widget = config.widget_config();
        assert_eq!(widget.idle.idle_threshold, Duration::from_secs(900));
        assert_eq!(widget.idle.check_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_twin_api_url_wins() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("TWIN_API_URL", "https://twin.example.com"),
                ("NEXT_PUBLIC_API_URL", "https://public.example.com"),
            ]))
            .unwrap();
        assert_eq!(config.api.url, "https://twin.example.com");
    }

    #[test]
    fn test_bad_env_number_rejected() {
        let mut config = Config::default();
        assert!(config
            .apply_env(env(&[("TWIN_REQUEST_TIMEOUT_SECS", "soon")]))
            .is_err());
        assert!(config
            .apply_env(env(&[("TWIN_IDLE_CHECK_SECS", "0")]))
            .is_err());
    }
}
