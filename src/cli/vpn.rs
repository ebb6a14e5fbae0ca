//! VPN connection management commands

use super::{backend, load, resolve_name};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use viscosity_core::backend::ConnectionScope;
use viscosity_core::error::{ConfigError, ViscosityError};
use viscosity_core::vpn::VpnConnection;

#[derive(Serialize)]
struct ConnectionEntry<'a> {
    name: &'a str,
    active: bool,
}

/// Run the list command
pub fn run_list(config_path: Option<&Path>, active_only: bool, json: bool) -> Result<(), ViscosityError> {
    let config = load(config_path)?;
    let backend = backend(&config)?;

    let all = backend.list_connections(ConnectionScope::All)?;
    let active = backend.list_connections(ConnectionScope::Active)?;

    let entries: Vec<ConnectionEntry> = all
        .iter()
        .map(|name| ConnectionEntry {
            name,
            active: active.contains(name),
        })
        .filter(|entry| entry.active || !active_only)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No connections".dimmed());
    }
    for entry in entries {
        if entry.active {
            println!("{} {}", "●".green(), entry.name.bold());
        } else {
            println!("{} {}", "○".dimmed(), entry.name);
        }
    }
    Ok(())
}

/// Run the connect command
///
/// Returns `false` if the connection did not come up in time. Ctrl+C stops
/// waiting early.
pub fn run_connect(
    config_path: Option<&Path>,
    name: Option<String>,
    timeout: Option<u64>,
) -> Result<bool, ViscosityError> {
    let mut config = load(config_path)?;
    if let Some(timeout) = timeout {
        config.connect_timeout_secs = timeout;
        config
            .validate()
            .map_err(|e| ViscosityError::Config(ConfigError::ValidationError { message: e }))?;
    }

    let name = resolve_name(name, &config)?;
    let connection =
        VpnConnection::new(name, backend(&config)?)?.with_options(config.connect_options());

    // Ctrl+C only stops the wait; the connect request stays with Viscosity
    let runtime = tokio::runtime::Runtime::new()?;
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            flag.store(true, Ordering::SeqCst);
        }
    });

    info!(
        "Connecting to '{}' (timeout {:?})",
        connection.name(),
        Duration::from_secs(config.connect_timeout_secs)
    );
    let connected = connection.connect_with_cancel(&cancel)?;

    if connected {
        println!("{} Connected to {}", "✓".green(), connection.name().bold());
    } else if cancel.load(Ordering::SeqCst) {
        println!("{} Stopped waiting for {}", "!".yellow(), connection.name().bold());
    } else {
        println!(
            "{} {} did not connect within {}s",
            "✗".red(),
            connection.name().bold(),
            config.connect_timeout_secs
        );
    }
    Ok(connected)
}

/// Run the disconnect command
pub fn run_disconnect(
    config_path: Option<&Path>,
    name: Option<String>,
    all: bool,
) -> Result<(), ViscosityError> {
    let config = load(config_path)?;
    let backend = backend(&config)?;

    if all {
        backend.disconnect_all()?;
        println!("{} Disconnected all connections", "✓".green());
        return Ok(());
    }

    let connection = VpnConnection::new(resolve_name(name, &config)?, backend)?;
    if connection.disconnect()? {
        println!("{} Disconnected {}", "✓".green(), connection.name().bold());
    } else {
        debug!("'{}' was not connected", connection.name());
        println!("{} is not connected", connection.name().bold());
    }
    Ok(())
}

/// Run the status command
pub fn run_status(config_path: Option<&Path>, name: Option<String>) -> Result<(), ViscosityError> {
    let config = load(config_path)?;
    let connection = VpnConnection::new(resolve_name(name, &config)?, backend(&config)?)?;

    if connection.is_connected()? {
        println!("{}: {}", connection.name().bold(), "connected".green());
    } else {
        println!("{}: {}", connection.name().bold(), "disconnected".red());
    }
    Ok(())
}
