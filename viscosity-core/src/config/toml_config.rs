//! TOML configuration file I/O
//!
//! Handles loading and saving the controller configuration to/from TOML
//! files in the user's configuration directory.

use crate::config::WatchConfig;
use crate::error::{ConfigError, ViscosityError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Get the default configuration directory
///
/// Returns ~/.config/viscosity, or VISCOSITY_CONFIG_DIR environment variable if set
pub fn get_config_dir() -> Result<PathBuf, ViscosityError> {
    // Allow tests to override config directory via environment variable
    if let Ok(config_dir) = std::env::var("VISCOSITY_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir));
    }

    let home = std::env::var("HOME").map_err(|_| {
        ViscosityError::Config(ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home).join(".config").join("viscosity"))
}

/// Get the default configuration file path
pub fn get_config_path() -> Result<PathBuf, ViscosityError> {
    let config_dir = get_config_dir()?;
    Ok(config_dir.join(CONFIG_FILE_NAME))
}

/// Load configuration from the default TOML file
///
/// A missing file yields the default configuration.
pub fn load_config() -> Result<WatchConfig, ViscosityError> {
    let config_path = get_config_path()?;
    if !config_path.exists() {
        debug!("No configuration at {:?}, using defaults", config_path);
        return Ok(WatchConfig::default());
    }
    load_config_from_path(&config_path)
}

/// Load configuration from a specific TOML file
pub fn load_config_from_path<P: AsRef<Path>>(path: P) -> Result<WatchConfig, ViscosityError> {
    let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ViscosityError::Config(ConfigError::LoadFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        }),
        _ => ViscosityError::Config(ConfigError::IoError {
            message: format!("Failed to read config file: {}", e),
        }),
    })?;

    let config: WatchConfig = toml::from_str(&contents)?;

    // Validate the loaded configuration
    config
        .validate()
        .map_err(|e| ViscosityError::Config(ConfigError::ValidationError { message: e }))?;

    debug!(
        "Loaded configuration from {:?}: poll_interval={}ms, connect_timeout={}s, refresh_interval={}s",
        path.as_ref(),
        config.poll_interval_ms,
        config.connect_timeout_secs,
        config.refresh_interval_secs
    );

    Ok(config)
}

/// Save configuration to a specific TOML file
pub fn save_config_to_path<P: AsRef<Path>>(
    config: &WatchConfig,
    path: P,
) -> Result<(), ViscosityError> {
    // Validate configuration before saving
    config
        .validate()
        .map_err(|e| ViscosityError::Config(ConfigError::ValidationError { message: e }))?;

    // Ensure config directory exists
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ViscosityError::Config(ConfigError::IoError {
                message: format!("Failed to create config directory: {}", e),
            })
        })?;
    }

    let contents = toml::to_string_pretty(config)?;

    std::fs::write(&path, contents).map_err(|_e| {
        ViscosityError::Config(ConfigError::SaveFailed {
            path: path.as_ref().to_string_lossy().to_string(),
        })
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let original_config = WatchConfig {
            connection: Some("Office".to_string()),
            poll_interval_ms: 250,
            connect_timeout_secs: 10,
            refresh_interval_secs: 2,
            osascript_path: Some("/usr/bin/osascript".to_string()),
        };

        save_config_to_path(&original_config, &config_path).unwrap();
        let loaded_config = load_config_from_path(&config_path).unwrap();

        assert_eq!(original_config, loaded_config);
    }

    #[test]
    fn test_missing_file_is_load_failed() {
        let temp_dir = tempdir().unwrap();
        let result = load_config_from_path(temp_dir.path().join("absent.toml"));
        assert!(matches!(
            result,
            Err(ViscosityError::Config(ConfigError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "poll_interval_ms = 1\n").unwrap();

        let result = load_config_from_path(&config_path);
        assert!(matches!(
            result,
            Err(ViscosityError::Config(ConfigError::ValidationError { .. }))
        ));
    }
}
