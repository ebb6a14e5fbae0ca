//! Connection monitoring with change notification
//!
//! A [`ConnectionMonitor`] watches one [`VpnConnection`] and tells its
//! observers when the connection goes up or down. It has no timer of its
//! own; the caller decides how often to call [`refresh`](ConnectionMonitor::refresh).

use crate::error::{ConnectionError, NotifierError};
use crate::vpn::connection::VpnConnection;
use crate::vpn::event::{EventFilter, VpnEvent};
use crate::vpn::notifier::{Notifier, Observer, SubscriberId};
use crate::vpn::state::ConnectivityState;
use std::sync::Arc;
use tracing::{debug, info};

/// Monitors a VPN connection and notifies observers of transitions
#[derive(Debug)]
pub struct ConnectionMonitor<'a> {
    connection: &'a VpnConnection,
    notifier: Notifier,
    state: ConnectivityState,
}

impl<'a> ConnectionMonitor<'a> {
    /// Create a monitor with no observers and an unknown state
    pub fn new(connection: &'a VpnConnection) -> Self {
        let span = tracing::info_span!("monitor", connection = %connection.name());
        Self::with_notifier(connection, Notifier::with_span(span))
    }

    /// Create a monitor that dispatches through the given notifier
    pub fn with_notifier(connection: &'a VpnConnection, notifier: Notifier) -> Self {
        Self {
            connection,
            notifier,
            state: ConnectivityState::Unknown,
        }
    }

    /// The monitored connection
    pub fn connection(&self) -> &VpnConnection {
        self.connection
    }

    /// The notifier observers are registered with
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// State recorded by the last successful refresh
    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Register an observer; see [`Notifier::register`]
    pub fn register(&self, observer: Arc<dyn Observer>, filter: EventFilter) -> SubscriberId {
        self.notifier.register(observer, filter)
    }

    /// Unregister an observer; see [`Notifier::unregister`]
    pub fn unregister(&self, id: SubscriberId) -> Result<(), NotifierError> {
        self.notifier.unregister(id)
    }

    /// Re-check connectivity and dispatch an event on a transition
    ///
    /// The first refresh only records the observed state. Returns the event
    /// that was dispatched, if any. On a backend failure the recorded state
    /// is left as it was.
    pub fn refresh(&mut self) -> Result<Option<VpnEvent>, ConnectionError> {
        let observed = ConnectivityState::from_connected(self.connection.is_connected()?);
        let previous = std::mem::replace(&mut self.state, observed);

        let event = match (previous, observed) {
            (ConnectivityState::Unknown, _) => {
                debug!(connection = %self.connection.name(), state = %observed, "Initial state observed");
                None
            }
            (before, after) if before == after => None,
            (_, ConnectivityState::Connected) => Some(VpnEvent::Started),
            (_, _) => Some(VpnEvent::Stopped),
        };

        if let Some(event) = event {
            let message = match event {
                VpnEvent::Started => format!("VPN('{}') is connected", self.connection.name()),
                VpnEvent::Stopped => format!("VPN('{}') is disconnected", self.connection.name()),
            };
            info!(connection = %self.connection.name(), %event, "{}", message);
            self.notifier.dispatch(event, Some(message.as_str()));
        }

        Ok(event)
    }
}
