//! Identity types for atomstore
//!
//! - KeyId: type-derived identity of an atom key (one slot per key per root)
//! - RootId: process-unique identity of a root instance
//! - AtomId: process-unique identity of an atom instance
//!
//! Key identity comes from the key's `TypeId`, never from a runtime-assigned
//! number, so it is stable for the lifetime of the program and distinguishes
//! keys whose value types are structurally identical. Root and atom ids are
//! diagnostic only and are drawn from atomic counters.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// KeyId
// ============================================================================

/// Identity of an atom key
///
/// Equality and hashing use the `TypeId` only; the type name is carried for
/// log fields and error messages.
#[derive(Clone, Copy)]
pub struct KeyId {
    type_id: TypeId,
    name: &'static str,
}

impl KeyId {
    /// Identity derived from the key type `K`
    pub fn of<K: ?Sized + 'static>() -> Self {
        KeyId {
            type_id: TypeId::of::<K>(),
            name: std::any::type_name::<K>(),
        }
    }

    /// Fully qualified type name of the key
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying `TypeId`
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for KeyId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for KeyId {}

impl Hash for KeyId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", self.name)
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// RootId / AtomId
// ============================================================================

static NEXT_ROOT_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_ATOM_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RootId(u64);

impl RootId {
    /// Allocate the next root id
    pub fn next() -> Self {
        RootId(NEXT_ROOT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RootId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root#{}", self.0)
    }
}

/// Process-unique identity of an atom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(u64);

impl AtomId {
    /// Allocate the next atom id
    pub fn next() -> Self {
        AtomId(NEXT_ATOM_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "atom#{}", self.0)
    }
}
