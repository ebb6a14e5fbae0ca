//! Backend module
//!
//! The control surface that actually connects, disconnects and lists
//! VPN connections. Everything above this layer only sees the
//! [`ConnectionBackend`] trait.

use crate::error::BackendError;
use std::collections::BTreeSet;

pub mod osascript;

// In-memory backend for tests and CI environments
#[cfg(any(test, feature = "mock-backend"))]
pub mod mock;

// Public re-exports
pub use osascript::OsaScriptBackend;

/// Which connections a listing should return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionScope {
    /// Every connection configured in the application
    All,
    /// Only connections currently in the connected state
    Active,
}

/// Primitive operations executed against the managed VPN application
///
/// Implementations must be callable from any thread.
pub trait ConnectionBackend: Send + Sync {
    /// Ask the application to bring up the named connection
    fn connect(&self, name: &str) -> Result<(), BackendError>;

    /// Ask the application to tear down the named connection
    fn disconnect(&self, name: &str) -> Result<(), BackendError>;

    /// Tear down every active connection
    fn disconnect_all(&self) -> Result<(), BackendError>;

    /// List connection names in the given scope
    fn list_connections(&self, scope: ConnectionScope) -> Result<BTreeSet<String>, BackendError>;
}
