//! Non-observing accessor
//!
//! `AtomValue` resolves its atom on first use and keeps it for the rest of
//! its life. A later `replace` on the root, or a scope reassignment, is not
//! picked up: it keeps reading and writing the atom it first resolved.

use super::{modify_through, write_through, RootSource, Setter};
use crate::atom::Atom;
use crate::key::AtomKey;
use once_cell::sync::OnceCell;
use std::fmt;
use std::marker::PhantomData;
use tracing::trace;

/// Memoized read/write projection of `K` in a root
pub struct AtomValue<K: AtomKey> {
    source: RootSource,
    atom: OnceCell<Atom<K::Value>>,
    setter: Option<Setter<K::Value>>,
    _key: PhantomData<fn() -> K>,
}

impl<K: AtomKey> AtomValue<K> {
    /// Accessor for `K` in the root provided by `source`
    pub fn new(source: impl Into<RootSource>) -> Self {
        Self {
            source: source.into(),
            atom: OnceCell::new(),
            setter: None,
            _key: PhantomData,
        }
    }

    /// Route writes through `f(new, &old)`
    pub fn with_setter(
        mut self,
        f: impl Fn(K::Value, &K::Value) -> K::Value + Send + Sync + 'static,
    ) -> Self {
        self.setter = Some(Setter::new(f));
        self
    }

    /// The memoized atom, resolving it on first call
    pub fn atom(&self) -> &Atom<K::Value> {
        self.atom.get_or_init(|| {
            let root = self.source.current();
            trace!(target: "atomstore::atom", root = %root.id(), key = %K::id(), "accessor resolved");
            root.resolve::<K>()
        })
    }

    /// True once the atom has been resolved
    pub fn is_resolved(&self) -> bool {
        self.atom.get().is_some()
    }

    /// Current value of the atom
    pub fn get(&self) -> K::Value {
        self.atom().get()
    }

    /// Write through the setter and the equality short-circuit
    ///
    /// Returns `true` when the atom's value changed.
    pub fn set(&self, value: K::Value) -> bool {
        write_through(self.atom(), self.setter.as_ref(), value)
    }

    /// Edit a copy of the current value and write it back
    pub fn modify(&self, f: impl FnOnce(&mut K::Value)) -> bool {
        modify_through(self.atom(), self.setter.as_ref(), f)
    }
}

impl<K: AtomKey> Clone for AtomValue<K> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            atom: self.atom.clone(),
            setter: self.setter.clone(),
            _key: PhantomData,
        }
    }
}

impl<K: AtomKey> fmt::Debug for AtomValue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomValue")
            .field("key", &K::id())
            .field("resolved", &self.is_resolved())
            .field("setter", &self.setter.is_some())
            .finish()
    }
}
