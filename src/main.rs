//! viscosity - Viscosity VPN controller
//!
//! A command-line tool for connecting, disconnecting and watching
//! connections configured in the Viscosity VPN client.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use viscosity_core::error::{ConnectionError, ViscosityError};
use viscosity_core::init_logging;

mod cli;

#[derive(Parser)]
#[command(name = "viscosity")]
#[command(about = "Control and monitor Viscosity VPN connections")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured connections
    List {
        /// Only show active connections
        #[arg(long)]
        active: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Connect and wait until the connection is up
    Connect {
        /// Connection name (defaults to the configured connection)
        name: Option<String>,
        /// Seconds to wait for the connection to come up
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
    /// Disconnect a connection
    Disconnect {
        /// Connection name (defaults to the configured connection)
        #[arg(conflicts_with = "all")]
        name: Option<String>,
        /// Disconnect every active connection
        #[arg(long)]
        all: bool,
    },
    /// Show whether a connection is up
    Status {
        /// Connection name (defaults to the configured connection)
        name: Option<String>,
    },
    /// Report connection state changes until interrupted
    Watch {
        /// Connection name (defaults to the configured connection)
        name: Option<String>,
        /// Seconds between checks
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::List { active, json } => cli::vpn::run_list(config_path, active, json).map(|()| 0),
        Commands::Connect { name, timeout } => {
            cli::vpn::run_connect(config_path, name, timeout)
                .map(|connected| if connected { 0 } else { 3 })
        }
        Commands::Disconnect { name, all } => {
            cli::vpn::run_disconnect(config_path, name, all).map(|()| 0)
        }
        Commands::Status { name } => cli::vpn::run_status(config_path, name).map(|()| 0),
        Commands::Watch { name, interval } => {
            cli::watch::run_watch(config_path, name, interval).map(|()| 0)
        }
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let exit_code = match e {
                // Configuration errors (exit code 2)
                ViscosityError::Config(_)
                | ViscosityError::Toml(_)
                | ViscosityError::TomlSerialize(_) => 2,
                // A connection name the application doesn't know is a usage error
                ViscosityError::Connection(ConnectionError::UnknownConnection { .. }) => 2,
                // Backend and runtime failures (exit code 1)
                ViscosityError::Connection(ConnectionError::Backend(_))
                | ViscosityError::Backend(_)
                | ViscosityError::Json(_)
                | ViscosityError::Io(_) => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
