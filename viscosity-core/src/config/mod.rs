//! Configuration module
//!
//! Handles the optional TOML settings for connecting and watching.

use crate::vpn::ConnectOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod toml_config;

/// Controller configuration
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Connection used when a command is given no name
    #[serde(default)]
    pub connection: Option<String>,

    /// Interval between active-connection polls while connecting
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Time to wait for a connection to come up
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Interval between monitor refreshes in `watch`
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Explicit osascript binary, otherwise looked up on PATH
    #[serde(default)]
    pub osascript_path: Option<String>,
}

fn default_poll_interval_ms() -> u64 {
    500
}
fn default_connect_timeout_secs() -> u64 {
    30
}
fn default_refresh_interval_secs() -> u64 {
    5
}

impl WatchConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.connection {
            if name.trim().is_empty() {
                return Err("Connection name cannot be empty".to_string());
            }
        }

        if !(10..=60_000).contains(&self.poll_interval_ms) {
            return Err(format!(
                "poll_interval_ms must be between 10 and 60000, got: {}",
                self.poll_interval_ms
            ));
        }

        if !(1..=3600).contains(&self.connect_timeout_secs) {
            return Err(format!(
                "connect_timeout_secs must be between 1 and 3600, got: {}",
                self.connect_timeout_secs
            ));
        }

        if self.poll_interval_ms > self.connect_timeout_secs * 1000 {
            return Err(format!(
                "poll_interval_ms ({}) must not exceed connect_timeout_secs ({}s)",
                self.poll_interval_ms, self.connect_timeout_secs
            ));
        }

        if !(1..=3600).contains(&self.refresh_interval_secs) {
            return Err(format!(
                "refresh_interval_secs must be between 1 and 3600, got: {}",
                self.refresh_interval_secs
            ));
        }

        Ok(())
    }

    /// Polling options for connecting
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.connect_timeout_secs),
        )
    }

    /// Interval between monitor refreshes
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            connection: None,
            poll_interval_ms: default_poll_interval_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            osascript_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = WatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.connect_options(), ConnectOptions::default());
        assert_eq!(config.refresh_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_configs() {
        let invalid_configs = vec![
            WatchConfig {
                connection: Some("  ".to_string()),
                ..WatchConfig::default()
            },
            WatchConfig {
                poll_interval_ms: 0,
                ..WatchConfig::default()
            },
            WatchConfig {
                connect_timeout_secs: 0,
                ..WatchConfig::default()
            },
            WatchConfig {
                poll_interval_ms: 5_000,
                connect_timeout_secs: 2,
                ..WatchConfig::default()
            },
            WatchConfig {
                refresh_interval_secs: 0,
                ..WatchConfig::default()
            },
        ];

        for config in invalid_configs {
            assert!(config.validate().is_err(), "{:?} should be invalid", config);
        }
    }
}
