//! Atom: a single observable mutable cell
//!
//! ## Design Principles
//!
//! 1. **Shared handle**: `Atom<V>` is an `Arc` handle. Clones address the same
//!    cell; ownership is shared between the root that stores it and every
//!    accessor or action that resolved it.
//! 2. **Notify on replacement only**: reads never notify. `set` always
//!    notifies; `set_if_changed` and `update` notify only when the equality
//!    policy reports a change.
//! 3. **No lock across sinks**: the value lock is released before sinks run,
//!    so a sink may write to this or any other atom. The cost is ordering:
//!    two threads writing the same atom may deliver to sinks in the opposite
//!    order of their stores, so the last value a sink saw is not always the
//!    stored one. Sinks that need the stored value re-read it with `get`.
//!    A single writer per atom never sees this.
//!
//! ## API
//!
//! - `get`, `with`, `revision`
//! - `set`, `set_if_changed`, `update`
//! - `subscribe` returning a `Subscription`

use crate::subscription::{Listeners, Subscription, Unsubscribe};
use atomstore_core::{AtomId, Equality};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::trace;

pub(crate) struct AtomInner<V> {
    id: AtomId,
    value: RwLock<V>,
    /// Number of effective mutations
    revision: AtomicU64,
    equality: Equality<V>,
    listeners: Listeners<V>,
}

impl<V: Send + Sync + 'static> Unsubscribe for AtomInner<V> {
    fn unsubscribe(&self, id: u64) {
        self.listeners.remove(id);
    }
}

/// Observable mutable state cell
///
/// # Example
///
/// ```rust,ignore
/// use atomstore_engine::Atom;
///
/// let counter = Atom::new(0);
/// let _sub = counter.subscribe(|v| println!("counter is now {}", v));
///
/// counter.set_if_changed(0); // equal, nothing happens
/// counter.set_if_changed(1); // prints "counter is now 1"
/// counter.update(|v| v + 1); // prints "counter is now 2"
/// ```
pub struct Atom<V> {
    inner: Arc<AtomInner<V>>,
}

impl<V> Clone for Atom<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Atom<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an atom compared with `PartialEq` on equality-gated writes
    pub fn new(value: V) -> Self
    where
        V: PartialEq,
    {
        Self::with_equality(value, Equality::partial_eq())
    }

    /// Create an atom with an explicit equality policy
    pub fn with_equality(value: V, equality: Equality<V>) -> Self {
        Self {
            inner: Arc::new(AtomInner {
                id: AtomId::next(),
                value: RwLock::new(value),
                revision: AtomicU64::new(0),
                equality,
                listeners: Listeners::new(),
            }),
        }
    }

    /// Create an atom that treats every write as a change
    pub fn without_equality(value: V) -> Self {
        Self::with_equality(value, Equality::never())
    }

    /// Process-unique identity of this atom
    pub fn id(&self) -> AtomId {
        self.inner.id
    }

    /// True when both handles address the same cell
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Weak handle that does not keep the cell alive
    pub fn downgrade(&self) -> WeakAtom<V> {
        WeakAtom {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Equality policy fixed at construction
    pub fn equality(&self) -> Equality<V> {
        self.inner.equality
    }

    // ========== Reads ==========

    /// Current value
    pub fn get(&self) -> V {
        self.inner.value.read().clone()
    }

    /// Borrow the current value without cloning
    ///
    /// The read lock is held while `f` runs; `f` must not write this atom.
    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Number of effective mutations since construction
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    // ========== Writes ==========

    /// Replace the value and notify unconditionally
    pub fn set(&self, value: V) {
        let snapshot = {
            let mut guard = self.inner.value.write();
            *guard = value;
            self.inner.revision.fetch_add(1, Ordering::AcqRel);
            self.snapshot(&guard)
        };
        trace!(target: "atomstore::atom", atom = %self.inner.id, "value set");
        self.deliver(snapshot);
    }

    /// Replace the value only if the equality policy reports a change
    ///
    /// Returns `true` when the value was replaced (and sinks notified).
    pub fn set_if_changed(&self, value: V) -> bool {
        let snapshot = {
            let mut guard = self.inner.value.write();
            if self.inner.equality.is_equal(&guard, &value) {
                trace!(target: "atomstore::atom", atom = %self.inner.id, "write suppressed, value unchanged");
                return false;
            }
            *guard = value;
            self.inner.revision.fetch_add(1, Ordering::AcqRel);
            self.snapshot(&guard)
        };
        trace!(target: "atomstore::atom", atom = %self.inner.id, "value changed");
        self.deliver(snapshot);
        true
    }

    /// Read-modify-write through the equality short-circuit
    ///
    /// `f` computes the next value from the current one while the write lock
    /// is held, so concurrent updates never lose increments. `f` must not
    /// touch this atom.
    pub fn update(&self, f: impl FnOnce(&V) -> V) -> bool {
        let snapshot = {
            let mut guard = self.inner.value.write();
            let next = f(&guard);
            if self.inner.equality.is_equal(&guard, &next) {
                trace!(target: "atomstore::atom", atom = %self.inner.id, "update suppressed, value unchanged");
                return false;
            }
            *guard = next;
            self.inner.revision.fetch_add(1, Ordering::AcqRel);
            self.snapshot(&guard)
        };
        trace!(target: "atomstore::atom", atom = %self.inner.id, "value updated");
        self.deliver(snapshot);
        true
    }

    // ========== Subscriptions ==========

    /// Register a sink invoked with the new value after every effective write
    ///
    /// Sinks must not capture a strong handle to this atom (that would keep
    /// it alive through its own sink set); capture a [`WeakAtom`] instead.
    pub fn subscribe(&self, sink: impl Fn(&V) + Send + Sync + 'static) -> Subscription {
        let (id, active) = self.inner.listeners.insert(Box::new(sink));
        let owner: Weak<dyn Unsubscribe> = Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        Subscription::new(id, active, owner)
    }

    /// Number of registered sinks
    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Copy of the freshly written value, taken only when someone listens
    fn snapshot(&self, value: &V) -> Option<V> {
        if self.inner.listeners.is_empty() {
            None
        } else {
            Some(value.clone())
        }
    }

    fn deliver(&self, snapshot: Option<V>) {
        if let Some(value) = snapshot {
            self.inner.listeners.notify(&value);
        }
    }
}

impl<V> fmt::Debug for Atom<V>
where
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atom")
            .field("id", &self.inner.id)
            .field("value", &*self.inner.value.read())
            .field("revision", &self.inner.revision.load(Ordering::Relaxed))
            .finish()
    }
}

// ============================================================================
// WeakAtom
// ============================================================================

/// Non-owning handle to an atom
pub struct WeakAtom<V> {
    inner: Weak<AtomInner<V>>,
}

impl<V> Clone for WeakAtom<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<V> WeakAtom<V> {
    /// Upgrade to a strong handle if the atom is still alive
    pub fn upgrade(&self) -> Option<Atom<V>> {
        self.inner.upgrade().map(|inner| Atom { inner })
    }
}
