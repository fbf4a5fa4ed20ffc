//! Accessors: read/write projections of one atom inside one root
//!
//! Two variants share the same read/write contract:
//!
//! | Variant | Resolution | Change propagation |
//! |---------|------------|--------------------|
//! | [`AtomValue`] | once, memoized for the accessor's lifetime | none |
//! | [`AtomState`] | again whenever the root's version differs | observer sink |
//!
//! ## Write contract
//!
//! `set(new)` computes `final = setter(new, &current)` when a [`Setter`] is
//! configured (otherwise `final = new`) and then applies
//! `atom.set_if_changed(final)`. A setter transforms intent; it does not
//! bypass the equality short-circuit. Setters are pure `(new, &old) -> final`
//! functions and run with no lock held.

mod source;
mod state;
mod value;

pub use source::{RootSource, Scope};
pub use state::AtomState;
pub use value::AtomValue;

use crate::atom::Atom;
use std::fmt;
use std::sync::Arc;

/// Pure write transform `(new, &old) -> final`
pub struct Setter<V> {
    f: Arc<dyn Fn(V, &V) -> V + Send + Sync>,
}

impl<V> Setter<V> {
    /// Wrap a transform
    pub fn new(f: impl Fn(V, &V) -> V + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    /// Compute the value to store
    pub fn apply(&self, new: V, old: &V) -> V {
        (self.f)(new, old)
    }
}

impl<V> Clone for Setter<V> {
    fn clone(&self) -> Self {
        Self {
            f: Arc::clone(&self.f),
        }
    }
}

impl<V> fmt::Debug for Setter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Setter")
    }
}

/// Apply the write contract to `atom`
pub(crate) fn write_through<V>(atom: &Atom<V>, setter: Option<&Setter<V>>, value: V) -> bool
where
    V: Clone + Send + Sync + 'static,
{
    let value = match setter {
        Some(setter) => {
            let current = atom.get();
            setter.apply(value, &current)
        }
        None => value,
    };
    atom.set_if_changed(value)
}

/// Edit a copy of the current value in place, then write it back
pub(crate) fn modify_through<V>(
    atom: &Atom<V>,
    setter: Option<&Setter<V>>,
    f: impl FnOnce(&mut V),
) -> bool
where
    V: Clone + Send + Sync + 'static,
{
    let mut next = atom.get();
    f(&mut next);
    write_through(atom, setter, next)
}
