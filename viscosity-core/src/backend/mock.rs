//! Mock backend implementation for testing
//!
//! Provides an in-memory stand-in for the VPN application that doesn't
//! require macOS or Viscosity. Used in CI environments and for testing.

use super::{ConnectionBackend, ConnectionScope};
use crate::error::BackendError;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MockState {
    known: BTreeSet<String>,
    active: BTreeSet<String>,
    /// Remaining active-list polls before a pending connection comes up
    pending: HashMap<String, u32>,
    /// `None` means connect requests never complete
    connect_delay: Option<u32>,
    failure: Option<String>,
    calls: CallCounts,
}

/// Number of calls made to each primitive
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub connect: u32,
    pub disconnect: u32,
    pub disconnect_all: u32,
    pub list_all: u32,
    pub list_active: u32,
}

/// In-memory VPN application
#[derive(Debug)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    /// Create a backend knowing the given connection names, none active
    pub fn new<I, S>(known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: Mutex::new(MockState {
                known: known.into_iter().map(Into::into).collect(),
                connect_delay: Some(0),
                ..MockState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the state from the others
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of active-list polls a connect request needs before the
    /// connection shows up as active; `None` keeps it down forever
    pub fn set_connect_delay(&self, polls: Option<u32>) {
        self.lock().connect_delay = polls;
    }

    /// Mark a connection as active or inactive without counting a call
    pub fn set_active(&self, name: &str, active: bool) {
        let mut state = self.lock();
        if active {
            state.active.insert(name.to_string());
        } else {
            state.active.remove(name);
        }
    }

    /// Make every subsequent call fail with the given reason
    pub fn fail_with(&self, reason: impl Into<String>) {
        self.lock().failure = Some(reason.into());
    }

    /// Stop injecting failures
    pub fn clear_failure(&self) {
        self.lock().failure = None;
    }

    /// Currently active connection names
    pub fn active(&self) -> BTreeSet<String> {
        self.lock().active.clone()
    }

    /// Snapshot of the call counters
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    fn check_failure(state: &MockState, command: &str) -> Result<(), BackendError> {
        match &state.failure {
            Some(reason) => Err(BackendError::ScriptFailed {
                command: command.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl ConnectionBackend for MockBackend {
    fn connect(&self, name: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.connect += 1;
        Self::check_failure(&state, "connect")?;

        match state.connect_delay {
            Some(0) => {
                state.active.insert(name.to_string());
            }
            Some(polls) => {
                state.pending.insert(name.to_string(), polls);
            }
            None => {}
        }
        Ok(())
    }

    fn disconnect(&self, name: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.disconnect += 1;
        Self::check_failure(&state, "disconnect")?;

        state.pending.remove(name);
        state.active.remove(name);
        Ok(())
    }

    fn disconnect_all(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.disconnect_all += 1;
        Self::check_failure(&state, "disconnectall")?;

        state.pending.clear();
        state.active.clear();
        Ok(())
    }

    fn list_connections(&self, scope: ConnectionScope) -> Result<BTreeSet<String>, BackendError> {
        let mut state = self.lock();
        match scope {
            ConnectionScope::All => {
                state.calls.list_all += 1;
                Self::check_failure(&state, "list connections")?;
                Ok(state.known.clone())
            }
            ConnectionScope::Active => {
                state.calls.list_active += 1;
                Self::check_failure(&state, "list active connections")?;

                let mut ready = Vec::new();
                for (name, remaining) in state.pending.iter_mut() {
                    if *remaining <= 1 {
                        ready.push(name.clone());
                    } else {
                        *remaining -= 1;
                    }
                }
                for name in ready {
                    state.pending.remove(&name);
                    state.active.insert(name);
                }

                Ok(state.active.clone())
            }
        }
    }
}
