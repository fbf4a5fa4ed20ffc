//! Atom keys: static descriptors addressing one slot in every root
//!
//! A key is a type. Its identity is the key type's `TypeId`, so two keys
//! are distinct even when their value types are identical, and the same key
//! addresses the same logical slot in every root.
//!
//! ```rust,ignore
//! struct CounterKey;
//!
//! impl AtomKey for CounterKey {
//!     type Value = i64;
//!
//!     fn default_value() -> i64 {
//!         0
//!     }
//!
//!     fn equality() -> Equality<i64> {
//!         Equality::partial_eq()
//!     }
//! }
//!
//! let counter = root.resolve::<CounterKey>();
//! ```

use crate::atom::Atom;
use atomstore_core::{Equality, KeyId};

/// Static descriptor binding an identity to an atom's default rule
pub trait AtomKey: 'static {
    /// Payload type of the addressed atom
    type Value: Clone + Send + Sync + 'static;

    /// Value a freshly constructed atom starts with
    fn default_value() -> Self::Value;

    /// Equality policy of atoms constructed for this key
    ///
    /// Use [`Equality::never`] for value types that cannot be compared.
    fn equality() -> Equality<Self::Value>;

    /// Build the atom stored on first resolution
    fn default_atom() -> Atom<Self::Value> {
        Atom::with_equality(Self::default_value(), Self::equality())
    }

    /// Slot identity
    ///
    /// Defaults to this key's own type. A key may return another key's id to
    /// alias that slot; both keys must then declare the same `Value` type or
    /// resolution fails with a type mismatch.
    fn id() -> KeyId {
        KeyId::of::<Self>()
    }
}
