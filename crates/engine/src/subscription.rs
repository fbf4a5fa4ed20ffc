//! Change-notification sinks and their RAII handles
//!
//! Both atoms (value changes) and roots (structural replacement) keep a
//! `Listeners` set. Registering a sink hands back a `Subscription`; dropping
//! it removes the sink.
//!
//! ## Lifetime rules
//!
//! - A subscription holds only a weak reference to its owner, so a forgotten
//!   handle never keeps an atom or root alive.
//! - Once a subscription is dropped or cancelled its sink is never invoked
//!   again, even if a notification snapshot was already taken.
//! - Sinks run after every internal lock has been released. A sink may write
//!   to any atom, including the one that notified it.

use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

/// Owner side of a subscription: anything a `Subscription` can detach from
pub(crate) trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: u64);
}

type Sink<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Listener<T> {
    active: Arc<AtomicBool>,
    sink: Sink<T>,
}

/// Ordered set of notification sinks
///
/// Sinks are invoked in registration order.
pub(crate) struct Listeners<T> {
    next_id: AtomicU64,
    count: AtomicUsize,
    entries: Mutex<BTreeMap<u64, Arc<Listener<T>>>>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            count: AtomicUsize::new(0),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register a sink, returning its id and liveness flag
    pub(crate) fn insert(&self, sink: Sink<T>) -> (u64, Arc<AtomicBool>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let active = Arc::new(AtomicBool::new(true));
        let listener = Arc::new(Listener {
            active: Arc::clone(&active),
            sink,
        });
        self.entries.lock().insert(id, listener);
        self.count.fetch_add(1, Ordering::Release);
        (id, active)
    }

    pub(crate) fn remove(&self, id: u64) {
        if let Some(listener) = self.entries.lock().remove(&id) {
            listener.active.store(false, Ordering::Release);
            self.count.fetch_sub(1, Ordering::Release);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every live sink with `value`
    ///
    /// The entry lock is released before any sink runs.
    pub(crate) fn notify(&self, value: &T) -> usize {
        let snapshot: SmallVec<[Arc<Listener<T>>; 4]> =
            self.entries.lock().values().cloned().collect();

        let mut delivered = 0;
        for listener in snapshot {
            if listener.active.load(Ordering::Acquire) {
                (listener.sink)(value);
                delivered += 1;
            }
        }
        delivered
    }
}

// ============================================================================
// Subscription handle
// ============================================================================

/// Handle to a registered notification sink
///
/// Dropping the handle unsubscribes. Use [`Subscription::detach`] to keep the
/// sink registered for the remaining lifetime of its owner.
#[must_use = "dropping a Subscription immediately unsubscribes its sink"]
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    owner: Option<Weak<dyn Unsubscribe>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, active: Arc<AtomicBool>, owner: Weak<dyn Unsubscribe>) -> Self {
        Self {
            id,
            active,
            owner: Some(owner),
        }
    }

    /// True while the sink is registered and its owner is alive
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
            && self
                .owner
                .as_ref()
                .map_or(true, |owner| owner.strong_count() > 0)
    }

    /// Unsubscribe now
    pub fn cancel(mut self) {
        self.release();
    }

    /// Keep the sink registered until its owner is dropped
    pub fn detach(mut self) {
        self.owner = None;
    }

    fn release(&mut self) {
        if let Some(owner) = self.owner.take() {
            self.active.store(false, Ordering::Release);
            if let Some(owner) = owner.upgrade() {
                owner.unsubscribe(self.id);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
