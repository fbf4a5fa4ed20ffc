//! Observing accessor
//!
//! `AtomState` remembers the root version it last resolved against. Every
//! access compares that with the current root's version; when they differ
//! (a `replace` happened, or the scope now points at another root) the atom
//! is resolved again.
//!
//! ## Observer
//!
//! With an observer installed the accessor resolves eagerly and keeps itself
//! current without being accessed:
//! - a value sink on the held atom forwards every effective change
//! - a sink on the held atom's root re-resolves after every `replace`
//! - a sink on the scope (for scoped sources) re-resolves after `assign`
//!
//! When re-resolution swaps in a different atom instance, the value sink
//! moves to it and the observer is invoked once with the new atom's value.
//! All three sinks hold the accessor weakly; dropping the accessor drops
//! them.

use super::{modify_through, write_through, RootSource, Setter};
use crate::atom::Atom;
use crate::key::AtomKey;
use crate::root::Root;
use crate::subscription::Subscription;
use atomstore_core::{RootId, Version};
use parking_lot::Mutex;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use tracing::debug;

type Observer<V> = Arc<dyn Fn(&V) + Send + Sync>;

struct Config<V> {
    source: RootSource,
    setter: Option<Setter<V>>,
    observer: Option<Observer<V>>,
}

impl<V> Clone for Config<V> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            setter: self.setter.clone(),
            observer: self.observer.clone(),
        }
    }
}

struct Resolved<V> {
    atom: Atom<V>,
    root: RootId,
    version: Version,
    _value_watch: Option<Subscription>,
    root_watch: Option<Subscription>,
}

struct StateInner<K: AtomKey> {
    config: Config<K::Value>,
    resolved: Mutex<Option<Resolved<K::Value>>>,
    _scope_watch: Option<Subscription>,
    _key: PhantomData<fn() -> K>,
}

impl<K: AtomKey> StateInner<K> {
    fn new(config: Config<K::Value>) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let scope_watch = match (&config.source, &config.observer) {
                (RootSource::Scoped(scope), Some(_)) => {
                    let weak = weak.clone();
                    Some(scope.subscribe_changes(move |_| {
                        if let Some(inner) = weak.upgrade() {
                            inner.sync();
                        }
                    }))
                }
                _ => None,
            };
            Self {
                config,
                resolved: Mutex::new(None),
                _scope_watch: scope_watch,
                _key: PhantomData,
            }
        })
    }

    /// Bring the held atom up to date with the current root and version
    fn sync(self: &Arc<Self>) -> Atom<K::Value> {
        let root = self.config.source.current();
        // Read the version before resolving: a replace racing with this call
        // leaves a stale version behind and forces another pass next time.
        let version = root.version();

        {
            let resolved = self.resolved.lock();
            if let Some(held) = resolved.as_ref() {
                if held.root == root.id() && held.version == version {
                    return held.atom.clone();
                }
            }
        }

        let atom = root.resolve::<K>();
        let (previous, swapped) = {
            let mut resolved = self.resolved.lock();
            match resolved.as_mut() {
                Some(held) if held.root == root.id() && held.atom.ptr_eq(&atom) => {
                    held.version = version;
                    (None, false)
                }
                _ => {
                    let mut previous = resolved.take();
                    let root_watch = match previous.as_mut() {
                        Some(prev) if prev.root == root.id() => prev.root_watch.take(),
                        _ => self.watch_root(&root),
                    };
                    let value_watch = self.config.observer.as_ref().map(|observer| {
                        let observer = Arc::clone(observer);
                        atom.subscribe(move |value| observer(value))
                    });
                    debug!(
                        target: "atomstore::atom",
                        root = %root.id(),
                        key = %K::id(),
                        version = %version,
                        atom = %atom.id(),
                        "accessor re-resolved"
                    );
                    *resolved = Some(Resolved {
                        atom: atom.clone(),
                        root: root.id(),
                        version,
                        _value_watch: value_watch,
                        root_watch,
                    });
                    let swapped = previous.is_some();
                    (previous, swapped)
                }
            }
        };
        // Old sinks are released outside the lock
        drop(previous);

        if swapped {
            if let Some(observer) = &self.config.observer {
                observer(&atom.get());
            }
        }
        atom
    }

    fn watch_root(self: &Arc<Self>, root: &Root) -> Option<Subscription> {
        self.config.observer.as_ref()?;
        let weak = Arc::downgrade(self);
        Some(root.subscribe_changes(move |_| {
            if let Some(inner) = weak.upgrade() {
                inner.sync();
            }
        }))
    }
}

/// Read/write projection of `K` that follows replacements
pub struct AtomState<K: AtomKey> {
    inner: Arc<StateInner<K>>,
}

impl<K: AtomKey> AtomState<K> {
    /// Accessor for `K` in the root provided by `source`
    ///
    /// Resolution is lazy until an observer is installed.
    pub fn new(source: impl Into<RootSource>) -> Self {
        Self::from_config(Config {
            source: source.into(),
            setter: None,
            observer: None,
        })
    }

    fn from_config(config: Config<K::Value>) -> Self {
        let observing = config.observer.is_some();
        let inner = StateInner::new(config);
        if observing {
            inner.sync();
        }
        Self { inner }
    }

    /// Route writes through `f(new, &old)`
    pub fn with_setter(
        self,
        f: impl Fn(K::Value, &K::Value) -> K::Value + Send + Sync + 'static,
    ) -> Self {
        let mut config = self.inner.config.clone();
        config.setter = Some(Setter::new(f));
        Self::from_config(config)
    }

    /// Invoke `sink` on every effective change of the held atom, and once
    /// with the new value whenever a replacement atom is picked up
    pub fn observe(self, sink: impl Fn(&K::Value) + Send + Sync + 'static) -> Self {
        let mut config = self.inner.config.clone();
        config.observer = Some(Arc::new(sink));
        Self::from_config(config)
    }

    /// Bring the held atom up to date with the current root and version
    ///
    /// Returns the atom now held.
    pub fn refresh(&self) -> Atom<K::Value> {
        self.inner.sync()
    }

    /// Current atom, re-resolved if the root changed
    pub fn atom(&self) -> Atom<K::Value> {
        self.refresh()
    }

    /// True when the next access will resolve again
    pub fn is_stale(&self) -> bool {
        let root = self.inner.config.source.current();
        match self.inner.resolved.lock().as_ref() {
            Some(held) => held.root != root.id() || held.version != root.version(),
            None => true,
        }
    }

    /// Root version the held atom was resolved against
    pub fn resolved_version(&self) -> Option<Version> {
        self.inner.resolved.lock().as_ref().map(|held| held.version)
    }

    /// Current value
    pub fn get(&self) -> K::Value {
        self.refresh().get()
    }

    /// Write through the setter and the equality short-circuit
    ///
    /// Returns `true` when the atom's value changed.
    pub fn set(&self, value: K::Value) -> bool {
        write_through(&self.refresh(), self.inner.config.setter.as_ref(), value)
    }

    /// Edit a copy of the current value and write it back
    pub fn modify(&self, f: impl FnOnce(&mut K::Value)) -> bool {
        modify_through(&self.refresh(), self.inner.config.setter.as_ref(), f)
    }
}

impl<K: AtomKey> fmt::Debug for AtomState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomState")
            .field("key", &K::id())
            .field("version", &self.resolved_version())
            .field("observing", &self.inner.config.observer.is_some())
            .finish()
    }
}
