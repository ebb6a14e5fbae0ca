//! Error types for the viscosity VPN controller
//!
//! This module defines all error types used throughout the workspace,
//! providing consistent error handling and user-friendly error messages.

use thiserror::Error;

/// Main error type for the viscosity application
#[derive(Error, Debug)]
pub enum ViscosityError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors raised while talking to the VPN application
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Errors related to a named VPN connection
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save configuration file: {path}")]
    SaveFailed { path: String },

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Failures of the external control surface
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Script command '{command}' failed: {reason}")]
    ScriptFailed { command: String, reason: String },

    #[error("Backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Failed to run backend command: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by connection handles and monitors
#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Connection '{name}' not found in Viscosity")]
    UnknownConnection { name: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Observer registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    #[error("Subscriber {id} is not registered")]
    NotRegistered { id: u64 },
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ViscosityError>;
