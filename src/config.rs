//! Configuration file structures for feedbot.
//!
//! The configuration is read from a YAML file, then overlaid with environment
//! variables prefixed by `FEEDBOT_`. Nested keys are separated by `__`, so
//! `FEEDBOT_DISCORD__TOKEN` overrides `discord.token`.
//!
//! # Configuration File Format
//!
//! ```yaml
//! discord:
//!   # Bot token from the Discord developer portal
//!   token: "your-bot-token"
//!
//!   # Optional user allowed to run maintenance commands.
//!   # Defaults to the owner of the Discord application.
//!   operator_id: 123456789012345678
//!
//!   # Optional deadline in seconds for Discord API lookups (default: 10)
//!   request_timeout: 10
//! ```

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::Deserialize;

/// Prefix of the environment variables overriding the configuration file.
const ENV_PREFIX: &str = "FEEDBOT_";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub discord: Discord,
}

#[derive(Debug, Deserialize)]
pub struct Discord {
    pub token: String,

    /// Maintenance operator, the application owner when unset
    #[serde(default)]
    pub operator_id: Option<u64>,

    /// Deadline of a single Discord API lookup, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

fn default_request_timeout() -> u64 {
    10
}

impl Discord {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Config {
    /// Loads the configuration file, overlaid with `FEEDBOT_` environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serial_test::serial;
    use tempfile::TempDir;

    use super::*;

    fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    #[serial]
    fn test_load_full_config() {
        let (_dir, path) = write_config(
            "discord:\n  token: \"secret\"\n  operator_id: 42\n  request_timeout: 3\n",
        );

        let config = Config::load(&path).unwrap();

        assert_eq!(config.discord.token, "secret");
        assert_eq!(config.discord.operator_id, Some(42));
        assert_eq!(config.discord.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        let (_dir, path) = write_config("discord:\n  token: \"secret\"\n");

        let config = Config::load(&path).unwrap();

        assert_eq!(config.discord.operator_id, None);
        assert_eq!(config.discord.request_timeout, 10);
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let (_dir, path) = write_config("discord:\n  token: \"from-file\"\n");

        // SAFETY: tests touching the environment are serialized
        unsafe { std::env::set_var("FEEDBOT_DISCORD__TOKEN", "from-env") };
        let config = Config::load(&path);
        unsafe { std::env::remove_var("FEEDBOT_DISCORD__TOKEN") };

        assert_eq!(config.unwrap().discord.token, "from-env");
    }

    #[test]
    #[serial]
    fn test_missing_token_is_an_error() {
        let (_dir, path) = write_config("discord:\n  operator_id: 42\n");

        assert!(Config::load(&path).is_err());
    }
}
