//! Where an accessor or dispatcher finds its root
//!
//! A consumer is either pinned to one root (`RootSource::Fixed`) or lives in
//! a scope whose root may be swapped by whoever owns that subtree
//! (`RootSource::Scoped`). Scoped consumers always see the root assigned at
//! the moment they look.

use crate::root::Root;
use crate::subscription::{Listeners, Subscription, Unsubscribe};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::debug;

struct ScopeInner {
    current: RwLock<Root>,
    listeners: Listeners<Root>,
}

impl Unsubscribe for ScopeInner {
    fn unsubscribe(&self, id: u64) {
        self.listeners.remove(id);
    }
}

/// Swappable binding of "the current root" for a subtree
///
/// Clones share the binding: assigning through one clone is visible through
/// all of them.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Bind a new scope to `root`
    pub fn new(root: Root) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                current: RwLock::new(root),
                listeners: Listeners::new(),
            }),
        }
    }

    /// Root currently assigned to this scope
    pub fn current(&self) -> Root {
        self.inner.current.read().clone()
    }

    /// Assign `root` to this scope
    ///
    /// Returns `false` (and changes nothing) when `root` is already the
    /// assigned root. Otherwise scope sinks are notified with the new root
    /// once the assignment is visible.
    pub fn assign(&self, root: Root) -> bool {
        {
            let mut current = self.inner.current.write();
            if current.ptr_eq(&root) {
                return false;
            }
            debug!(target: "atomstore::root", from = %current.id(), to = %root.id(), "Scope root reassigned");
            *current = root.clone();
        }
        self.inner.listeners.notify(&root);
        true
    }

    /// Register a sink invoked with the new root after every effective `assign`
    pub fn subscribe_changes(&self, sink: impl Fn(&Root) + Send + Sync + 'static) -> Subscription {
        let (id, active) = self.inner.listeners.insert(Box::new(sink));
        let owner: Weak<dyn Unsubscribe> = Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        Subscription::new(id, active, owner)
    }

    /// True when both handles share the same binding
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("root", &self.inner.current.read().id())
            .finish()
    }
}

/// Root provider for accessors
#[derive(Debug, Clone)]
pub enum RootSource {
    /// Always the same root
    Fixed(Root),
    /// Whatever root the scope holds at access time
    Scoped(Scope),
}

impl RootSource {
    /// Root to use for the current access
    pub fn current(&self) -> Root {
        match self {
            RootSource::Fixed(root) => root.clone(),
            RootSource::Scoped(scope) => scope.current(),
        }
    }
}

impl From<Root> for RootSource {
    fn from(root: Root) -> Self {
        RootSource::Fixed(root)
    }
}

impl From<&Root> for RootSource {
    fn from(root: &Root) -> Self {
        RootSource::Fixed(root.clone())
    }
}

impl From<Scope> for RootSource {
    fn from(scope: Scope) -> Self {
        RootSource::Scoped(scope)
    }
}

impl From<&Scope> for RootSource {
    fn from(scope: &Scope) -> Self {
        RootSource::Scoped(scope.clone())
    }
}
