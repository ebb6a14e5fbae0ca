//! VPN connectivity state
//!
//! Defines the tri-valued state tracked by a connection monitor between
//! refreshes.

/// Last observed connectivity of a VPN connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectivityState {
    /// Nothing observed yet
    #[default]
    Unknown,

    /// Connection was active at the last refresh
    Connected,

    /// Connection was inactive at the last refresh
    Disconnected,
}

impl ConnectivityState {
    /// Map an `is_connected` observation onto a state
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    /// Check if this state is `Connected`
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if nothing has been observed yet
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectivityState::Unknown => write!(f, "unknown"),
            ConnectivityState::Connected => write!(f, "connected"),
            ConnectivityState::Disconnected => write!(f, "disconnected"),
        }
    }
}
