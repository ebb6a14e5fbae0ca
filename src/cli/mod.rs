//! CLI command implementations
//!
//! This module contains the implementation of all CLI subcommands and the
//! setup they share.

pub mod vpn;
pub mod watch;

use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use viscosity_core::backend::{ConnectionBackend, OsaScriptBackend};
use viscosity_core::config::toml_config::{load_config, load_config_from_path};
use viscosity_core::config::WatchConfig;
use viscosity_core::error::{ConfigError, ViscosityError};

/// Load the configuration from `path`, or from the default location
fn load(path: Option<&Path>) -> Result<WatchConfig, ViscosityError> {
    match path {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    }
}

/// Build the backend described by the configuration
fn backend(config: &WatchConfig) -> Result<Arc<dyn ConnectionBackend>, ViscosityError> {
    let backend = match &config.osascript_path {
        Some(path) => OsaScriptBackend::new(path),
        None => OsaScriptBackend::locate()?,
    };
    debug!("Using osascript at {:?}", backend.osascript_path());
    Ok(Arc::new(backend))
}

/// Pick the connection name from the command line or the configuration
fn resolve_name(name: Option<String>, config: &WatchConfig) -> Result<String, ViscosityError> {
    name.or_else(|| config.connection.clone()).ok_or_else(|| {
        ViscosityError::Config(ConfigError::MissingField {
            field: "connection".to_string(),
        })
    })
}
