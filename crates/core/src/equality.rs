//! Equality short-circuit policy
//!
//! Every equality-gated write compares the incoming value against the stored
//! one and skips the mutation (and the notification) when they are equal.
//! Comparison is an explicit capability chosen per atom:
//!
//! - `Equality::partial_eq()` for value types implementing `PartialEq`
//! - `Equality::by(f)` for a custom comparison
//! - `Equality::never()` for types that opt out; every write counts as a change
//!
//! There is no guessing for opaque types: a type without an explicit policy
//! cannot build an equality-gated atom through the `PartialEq` path.

use std::fmt;

/// Comparison policy applied on every equality-gated write
pub struct Equality<V> {
    eq: Option<fn(&V, &V) -> bool>,
}

impl<V> Equality<V> {
    /// Policy that never short-circuits
    pub const fn never() -> Self {
        Equality { eq: None }
    }

    /// Policy using a custom comparison function
    pub const fn by(eq: fn(&V, &V) -> bool) -> Self {
        Equality { eq: Some(eq) }
    }

    /// True when `new` should be treated as no change relative to `old`
    pub fn is_equal(&self, old: &V, new: &V) -> bool {
        match self.eq {
            Some(eq) => eq(old, new),
            None => false,
        }
    }

    /// Whether this policy can ever suppress a write
    pub fn short_circuits(&self) -> bool {
        self.eq.is_some()
    }
}

impl<V: PartialEq> Equality<V> {
    /// Policy comparing with `PartialEq`
    pub fn partial_eq() -> Self {
        Equality {
            eq: Some(<V as PartialEq>::eq),
        }
    }
}

impl<V> Clone for Equality<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Equality<V> {}

impl<V> fmt::Debug for Equality<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.eq {
            Some(_) => f.write_str("Equality::Compare"),
            None => f.write_str("Equality::Never"),
        }
    }
}
