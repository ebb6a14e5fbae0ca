//! VPN connection module
//!
//! Handles named connection control and connectivity change notification.

pub mod connection;
pub mod event;
pub mod monitor;
pub mod notifier;
pub mod state;

// Public re-exports
pub use connection::{ConnectOptions, VpnConnection};
pub use event::{EventFilter, VpnEvent};
pub use monitor::ConnectionMonitor;
pub use notifier::{observer_fn, Notifier, Observer, SubscriberId};
pub use state::ConnectivityState;
