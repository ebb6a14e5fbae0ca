//! Named VPN connection handle
//!
//! A [`VpnConnection`] binds a connection name that the backend knows about
//! and issues connect/disconnect requests for it. It never caches
//! connectivity: every query goes back to the backend.

use crate::backend::{ConnectionBackend, ConnectionScope};
use crate::error::ConnectionError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Span};

/// Default interval between active-connection polls after a connect request
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default time budget for a connection to come up
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(30);

/// Shortest delay used between polls, whatever the configured interval
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Polling parameters for [`VpnConnection::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Delay between two active-connection polls
    pub poll_interval: Duration,

    /// Total time to wait for the connection to become active
    pub max_wait: Duration,
}

impl ConnectOptions {
    /// Create polling options
    pub fn new(poll_interval: Duration, max_wait: Duration) -> Self {
        Self {
            poll_interval,
            max_wait,
        }
    }

    /// Delay actually slept between polls
    ///
    /// `poll_interval`, raised to [`MIN_POLL_INTERVAL`].
    pub fn effective_poll_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    /// Upper bound on the number of polls made after the connect request
    ///
    /// `ceil(max_wait / effective_poll_interval)`, never less than one.
    pub fn max_polls(&self) -> u32 {
        let interval = self.effective_poll_interval().as_nanos();
        let polls = self.max_wait.as_nanos().div_ceil(interval).max(1);
        u32::try_from(polls).unwrap_or(u32::MAX)
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, DEFAULT_MAX_WAIT)
    }
}

/// A VPN connection configured in the backend application
pub struct VpnConnection {
    name: String,
    backend: Arc<dyn ConnectionBackend>,
    options: ConnectOptions,
    span: Span,
}

impl VpnConnection {
    /// Bind a handle to an existing connection
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError::UnknownConnection` if the backend does not
    /// list `name` among its configured connections, or
    /// `ConnectionError::Backend` if listing fails.
    pub fn new(
        name: impl Into<String>,
        backend: Arc<dyn ConnectionBackend>,
    ) -> Result<Self, ConnectionError> {
        let name = name.into();
        let known = backend.list_connections(ConnectionScope::All)?;
        if !known.contains(&name) {
            return Err(ConnectionError::UnknownConnection { name });
        }

        let span = tracing::info_span!("vpn_connection", connection = %name);
        Ok(Self {
            name,
            backend,
            options: ConnectOptions::default(),
            span,
        })
    }

    /// Replace the connect polling options
    pub fn with_options(mut self, options: ConnectOptions) -> Self {
        self.options = options;
        self
    }

    /// Record this handle's logs under `span` instead of its default span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Connection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current connect polling options
    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// Check whether the connection is currently active
    pub fn is_connected(&self) -> Result<bool, ConnectionError> {
        let active = self.backend.list_connections(ConnectionScope::Active)?;
        Ok(active.contains(&self.name))
    }

    /// Connect and wait until the connection is active
    ///
    /// Returns `Ok(false)` if the connection did not come up within the
    /// configured wait budget. Timing out is not an error.
    pub fn connect(&self) -> Result<bool, ConnectionError> {
        let never = AtomicBool::new(false);
        self.connect_with_cancel(&never)
    }

    /// Like [`connect`](Self::connect), but stops waiting once `cancel` is set
    ///
    /// Cancelling returns `Ok(false)`. The connect request already sent to
    /// the backend is not withdrawn. The flag is checked after each poll, so
    /// a cancel raised while sleeping takes effect up to one poll interval
    /// later.
    pub fn connect_with_cancel(&self, cancel: &AtomicBool) -> Result<bool, ConnectionError> {
        let _entered = self.span.enter();

        let active = self.backend.list_connections(ConnectionScope::Active)?;
        if active.contains(&self.name) {
            debug!("Already connected");
            return Ok(true);
        }
        if !active.is_empty() {
            info!(
                others = ?active,
                "VPN connect({}): already connected to non-preferred VPN(s)",
                self.name
            );
        }

        self.backend.connect(&self.name)?;

        let deadline = Instant::now() + self.options.max_wait;
        let max_polls = self.options.max_polls();
        for poll in 1..=max_polls {
            if self.is_connected()? {
                info!(polls = poll, "VPN: connected to '{}'", self.name);
                return Ok(true);
            }
            if cancel.load(Ordering::SeqCst) {
                info!(polls = poll, "VPN: stopped waiting for '{}'", self.name);
                return Ok(false);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if poll == max_polls || remaining.is_zero() {
                break;
            }
            std::thread::sleep(self.options.effective_poll_interval().min(remaining));
        }

        warn!(
            max_wait_ms = self.options.max_wait.as_millis(),
            "VPN: failed to connect to '{}'", self.name
        );
        Ok(false)
    }

    /// Disconnect if currently connected
    ///
    /// Returns `true` if a disconnect request was sent. Does not wait for
    /// the connection to go down.
    pub fn disconnect(&self) -> Result<bool, ConnectionError> {
        let _entered = self.span.enter();

        if !self.is_connected()? {
            debug!("Not connected, nothing to disconnect");
            return Ok(false);
        }
        self.backend.disconnect(&self.name)?;
        Ok(true)
    }
}

impl std::fmt::Debug for VpnConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VpnConnection")
            .field("name", &self.name)
            .field("options", &self.options)
            .finish()
    }
}
