//! Connection watch command
//!
//! Refreshes a connection monitor on a fixed interval and prints every
//! transition until interrupted.

use super::{backend, load, resolve_name};
use chrono::Local;
use colored::Colorize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use viscosity_core::error::{ConfigError, ViscosityError};
use viscosity_core::vpn::{
    observer_fn, ConnectionMonitor, EventFilter, Observer, VpnConnection, VpnEvent,
};

/// Observer printing timestamped transitions to stdout
fn console_observer() -> std::sync::Arc<dyn Observer> {
    observer_fn(|_, event, message| {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let label = match event {
            VpnEvent::Started => "UP".green().bold(),
            VpnEvent::Stopped => "DOWN".red().bold(),
        };
        println!("[{}] {} {}", timestamp, label, message.unwrap_or_default());
        Ok(())
    })
}

/// Run the watch command
pub fn run_watch(
    config_path: Option<&Path>,
    name: Option<String>,
    interval: Option<u64>,
) -> Result<(), ViscosityError> {
    let mut config = load(config_path)?;
    if let Some(interval) = interval {
        config.refresh_interval_secs = interval;
        config
            .validate()
            .map_err(|e| ViscosityError::Config(ConfigError::ValidationError { message: e }))?;
    }

    let name = resolve_name(name, &config)?;
    let connection = VpnConnection::new(name, backend(&config)?)?;
    let mut monitor = ConnectionMonitor::new(&connection);
    monitor.register(console_observer(), EventFilter::All);

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(watch_loop(&mut monitor, config.refresh_interval()))
}

async fn watch_loop(
    monitor: &mut ConnectionMonitor<'_>,
    refresh_interval: Duration,
) -> Result<(), ViscosityError> {
    let mut ticker = tokio::time::interval(refresh_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        "Watching '{}' every {:?}, press Ctrl+C to stop",
        monitor.connection().name(),
        refresh_interval
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut first = true;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, stopping watch");
                break;
            }
            _ = ticker.tick() => {
                // Backend calls block on osascript
                match tokio::task::block_in_place(|| monitor.refresh()) {
                    Ok(_) if first => {
                        first = false;
                        println!(
                            "{} is {}",
                            monitor.connection().name().bold(),
                            monitor.state()
                        );
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Refresh failed: {}", e),
                }
            }
        }
    }

    monitor.notifier().clear();
    Ok(())
}
