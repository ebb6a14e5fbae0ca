//! Connection event types
//!
//! Defines the transition events dispatched to observers and the filters
//! observers register with.

use std::collections::BTreeSet;

/// Transition events emitted when observed connectivity changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VpnEvent {
    /// Connection went from disconnected to connected
    Started,

    /// Connection went from connected to disconnected
    Stopped,
}

impl VpnEvent {
    /// Legacy numeric event code
    pub fn code(&self) -> u32 {
        match self {
            VpnEvent::Stopped => 100,
            VpnEvent::Started => 101,
        }
    }
}

impl std::fmt::Display for VpnEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VpnEvent::Started => write!(f, "started"),
            VpnEvent::Stopped => write!(f, "stopped"),
        }
    }
}

/// Which events an observer wants to receive
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EventFilter {
    /// Every event
    #[default]
    All,

    /// Only the listed events
    Only(BTreeSet<VpnEvent>),
}

impl EventFilter {
    /// Build a filter accepting only the given events
    pub fn only(events: impl IntoIterator<Item = VpnEvent>) -> Self {
        Self::Only(events.into_iter().collect())
    }

    /// Check whether an event passes this filter
    pub fn matches(&self, event: VpnEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Only(events) => events.contains(&event),
        }
    }
}

impl From<VpnEvent> for EventFilter {
    fn from(event: VpnEvent) -> Self {
        Self::only([event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_codes() {
        assert_eq!(VpnEvent::Stopped.code(), 100);
        assert_eq!(VpnEvent::Started.code(), 101);
    }

    #[test]
    fn test_filter_matching() {
        assert!(EventFilter::All.matches(VpnEvent::Started));
        assert!(EventFilter::All.matches(VpnEvent::Stopped));

        let started_only = EventFilter::from(VpnEvent::Started);
        assert!(started_only.matches(VpnEvent::Started));
        assert!(!started_only.matches(VpnEvent::Stopped));

        // An empty explicit set accepts nothing
        assert!(!EventFilter::only([]).matches(VpnEvent::Started));
    }
}
