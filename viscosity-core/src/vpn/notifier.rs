//! Observer registry and event dispatch
//!
//! A [`Notifier`] maps subscriber ids to an observer and an [`EventFilter`].
//! Dispatch is synchronous: every matching observer runs on the caller's
//! thread, in registration order, before `dispatch` returns.
//!
//! # Invariants
//!
//! 1. Registering the same `Arc` twice keeps one subscription, updates its
//!    filter and returns the original id.
//! 2. Dispatch works on a snapshot taken when it starts. Observers may
//!    register or unregister others without affecting the pass in flight.
//! 3. An observer that errors or panics is logged and skipped; it stays
//!    registered and never stops delivery to the remaining observers.

use crate::error::NotifierError;
use crate::vpn::event::{EventFilter, VpnEvent};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, Span};

/// Receives events dispatched by a [`Notifier`]
pub trait Observer: Send + Sync {
    /// Handle one event
    ///
    /// Errors are logged by the dispatcher and never reach the publisher.
    fn notify(&self, source: &Notifier, event: VpnEvent, message: Option<&str>)
        -> anyhow::Result<()>;
}

impl<F> Observer for F
where
    F: Fn(&Notifier, VpnEvent, Option<&str>) -> anyhow::Result<()> + Send + Sync,
{
    fn notify(
        &self,
        source: &Notifier,
        event: VpnEvent,
        message: Option<&str>,
    ) -> anyhow::Result<()> {
        self(source, event, message)
    }
}

/// Wrap a closure as a shareable observer
pub fn observer_fn<F>(f: F) -> Arc<dyn Observer>
where
    F: Fn(&Notifier, VpnEvent, Option<&str>) -> anyhow::Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Opaque identity of a registered observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Raw numeric id
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscriber#{}", self.0)
    }
}

#[derive(Clone)]
struct Subscription {
    id: SubscriberId,
    observer: Arc<dyn Observer>,
    filter: EventFilter,
}

/// Dispatches events to interested observers
pub struct Notifier {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
    span: Span,
}

impl Notifier {
    /// Create an empty notifier logging under a `notifier` span
    pub fn new() -> Self {
        Self::with_span(tracing::info_span!("notifier"))
    }

    /// Create an empty notifier whose logs are recorded under `span`
    pub fn with_span(span: Span) -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            span,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Subscription>> {
        self.subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    /// Register an observer for the events accepted by `filter`
    ///
    /// Registering an observer that is already registered replaces its
    /// filter and returns its existing id.
    pub fn register(&self, observer: Arc<dyn Observer>, filter: EventFilter) -> SubscriberId {
        let _entered = self.span.enter();
        let mut subscriptions = self.lock();

        if let Some(existing) = subscriptions
            .iter_mut()
            .find(|s| Arc::ptr_eq(&s.observer, &observer))
        {
            debug!(subscriber = %existing.id, ?filter, "Replacing observer filter");
            existing.filter = filter;
            return existing.id;
        }

        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(subscriber = %id, ?filter, "Registered observer");
        subscriptions.push(Subscription {
            id,
            observer,
            filter,
        });
        id
    }

    /// Remove an observer
    ///
    /// # Errors
    ///
    /// Returns `NotifierError::NotRegistered` if `id` is not registered,
    /// including when it was already removed.
    pub fn unregister(&self, id: SubscriberId) -> Result<(), NotifierError> {
        let _entered = self.span.enter();
        let mut subscriptions = self.lock();

        let position = subscriptions
            .iter()
            .position(|s| s.id == id)
            .ok_or(NotifierError::NotRegistered { id: id.0 })?;
        subscriptions.remove(position);
        debug!(subscriber = %id, "Unregistered observer");
        Ok(())
    }

    /// Check whether `id` is currently registered
    pub fn is_registered(&self, id: SubscriberId) -> bool {
        self.lock().iter().any(|s| s.id == id)
    }

    /// Number of registered observers
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if no observers are registered
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every subscription
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Deliver `event` to every observer whose filter accepts it
    ///
    /// Returns the number of observers that handled the event without
    /// failing.
    pub fn dispatch(&self, event: VpnEvent, message: Option<&str>) -> usize {
        let _entered = self.span.enter();
        let snapshot: Vec<Subscription> = self
            .lock()
            .iter()
            .filter(|s| s.filter.matches(event))
            .cloned()
            .collect();

        debug!(%event, observers = snapshot.len(), "Dispatching event");

        let mut delivered = 0;
        for subscription in &snapshot {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                subscription.observer.notify(self, event, message)
            }));

            match outcome {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => {
                    let reason = format!("{:#}", e);
                    error!(
                        subscriber = %subscription.id,
                        %event,
                        error = %reason,
                        "Observer failed while handling event"
                    );
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    error!(
                        subscriber = %subscription.id,
                        %event,
                        panic = %reason,
                        "Observer panicked while handling event"
                    );
                }
            }
        }

        delivered
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<SubscriberId> = self.lock().iter().map(|s| s.id).collect();
        f.debug_struct("Notifier").field("subscribers", &ids).finish()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
