//! Root: the keyed registry owning atom instances for one scope
//!
//! This module provides the `Root` handle that:
//! - Lazily constructs atoms from their key's default rule on first access
//! - Memoizes one atom per key identity
//! - Replaces atoms wholesale, advancing an opaque version token
//! - Emits a root-level change signal after every replacement
//!
//! ## Storage
//!
//! Each key identity maps to a slot (`OnceCell`). Looking a slot up holds the
//! storage shard lock only long enough to clone the slot handle; the default
//! rule runs outside it. Concurrent first resolution of the same key blocks on
//! the slot's `OnceCell`, so the default rule runs exactly once and every
//! caller observes the same atom. Resolution of different keys never
//! contends beyond the shard lookup. A `replace` that lands while a default
//! is being built wins: the resolver notices its slot was swapped out and
//! resolves again against the stored atom.
//!
//! ## Scoping
//!
//! Roots never share storage. Scoping a subtree means constructing a fresh
//! root for it (see [`crate::accessor::Scope`]).

pub mod builder;
pub mod config;
mod registry;

pub use builder::RootBuilder;
pub use config::RootConfig;
pub use registry::{default_root, install_default_root};

use crate::atom::Atom;
use crate::key::AtomKey;
use crate::subscription::{Listeners, Subscription, Unsubscribe};
use atomstore_core::{AtomError, KeyId, Result, RootId, Version};
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rustc_hash::FxHasher;
use std::any::Any;
use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

type ErasedAtom = Box<dyn Any + Send + Sync>;
type Slot = OnceCell<ErasedAtom>;
type SlotMap = DashMap<KeyId, Arc<Slot>, BuildHasherDefault<FxHasher>>;

pub(crate) struct RootInner {
    id: RootId,
    label: Option<String>,
    slots: SlotMap,
    version: RwLock<Version>,
    listeners: Listeners<Version>,
    /// Lazy constructions performed (metrics only, Relaxed)
    constructions: AtomicU64,
    /// Wholesale replacements performed (metrics only, Relaxed)
    replacements: AtomicU64,
}

impl Unsubscribe for RootInner {
    fn unsubscribe(&self, id: u64) {
        self.listeners.remove(id);
    }
}

/// Snapshot of root counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootStats {
    /// Slots currently holding an atom
    pub atoms: usize,
    /// Atoms built through a key's default rule
    pub constructions: u64,
    /// Calls to `replace`
    pub replacements: u64,
}

/// Keyed registry of atoms
///
/// `Root` is a cheap handle; clones refer to the same registry. The registry
/// is dropped with its last handle (atoms live on while something else still
/// holds them).
///
/// # Example
///
/// ```rust,ignore
/// use atomstore_engine::Root;
///
/// let root = Root::new();
/// let counter = root.resolve::<CounterKey>();   // built from the default rule
/// counter.set_if_changed(5);
/// assert_eq!(root.resolve::<CounterKey>().get(), 5);  // same atom
///
/// root.replace::<CounterKey>(Atom::new(100));   // version advances
/// ```
#[derive(Clone)]
pub struct Root {
    inner: Arc<RootInner>,
}

impl Root {
    /// Create an empty root with default configuration
    pub fn new() -> Self {
        Self::from_parts(&RootConfig::default(), Vec::new())
    }

    /// Create an empty root with a validated configuration
    pub fn with_config(config: RootConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(&config, Vec::new()))
    }

    /// Fluent builder for roots with preconfigured atoms
    pub fn builder() -> RootBuilder {
        RootBuilder::new()
    }

    /// Assemble a root from an already validated config and preset atoms
    pub(crate) fn from_parts(config: &RootConfig, preset: Vec<(KeyId, ErasedAtom)>) -> Self {
        let hasher = BuildHasherDefault::<FxHasher>::default();
        let slots = match config.shard_amount {
            Some(shards) => SlotMap::with_capacity_and_hasher_and_shard_amount(
                config.initial_capacity,
                hasher,
                shards,
            ),
            None => SlotMap::with_capacity_and_hasher(config.initial_capacity, hasher),
        };

        let preset_count = preset.len();
        for (id, atom) in preset {
            slots.insert(id, Arc::new(OnceCell::with_value(atom)));
        }

        let root = Self {
            inner: Arc::new(RootInner {
                id: RootId::next(),
                label: config.label.clone(),
                slots,
                version: RwLock::new(Version::next()),
                listeners: Listeners::new(),
                constructions: AtomicU64::new(0),
                replacements: AtomicU64::new(0),
            }),
        };

        debug!(
            target: "atomstore::root",
            root = %root.inner.id,
            label = root.label().unwrap_or(""),
            preset = preset_count,
            "Root created"
        );
        root
    }

    // ========== Identity ==========

    /// Process-unique identity
    pub fn id(&self) -> RootId {
        self.inner.id
    }

    /// Human label from the configuration, if any
    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// True when both handles refer to the same registry
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Weak handle, for sinks that need to reach back into their root
    pub fn downgrade(&self) -> WeakRoot {
        WeakRoot {
            inner: Arc::downgrade(&self.inner),
        }
    }

    // ========== Resolution ==========

    /// Get or create the atom for `K`
    ///
    /// # Panics
    ///
    /// Panics if the slot for `K::id()` holds an atom of a different value
    /// type. That only happens when keys alias a slot with mismatched types;
    /// use [`Root::try_resolve`] to observe it as an error instead.
    pub fn resolve<K: AtomKey>(&self) -> Atom<K::Value> {
        match self.try_resolve::<K>() {
            Ok(atom) => atom,
            Err(e) => panic!("{}", e),
        }
    }

    /// Get or create the atom for `K`, reporting slot type mismatches
    pub fn try_resolve<K: AtomKey>(&self) -> Result<Atom<K::Value>> {
        let key = K::id();
        loop {
            let slot = self.slot(key);

            let mut constructed = false;
            let erased = slot.get_or_init(|| {
                constructed = true;
                Box::new(K::default_atom()) as ErasedAtom
            });

            // A replace may have swapped the slot out while the default was
            // being built; the atom in the detached slot is unreachable.
            if !self.is_current_slot(key, &slot) {
                debug!(target: "atomstore::root", root = %self.inner.id, key = %key, "Slot replaced during resolution, retrying");
                continue;
            }

            if constructed {
                self.inner.constructions.fetch_add(1, Ordering::Relaxed);
                debug!(target: "atomstore::root", root = %self.inner.id, key = %key, "Atom constructed from default rule");
            }

            return erased
                .downcast_ref::<Atom<K::Value>>()
                .cloned()
                .ok_or_else(|| {
                    warn!(target: "atomstore::root", root = %self.inner.id, key = %key, "Slot type mismatch");
                    AtomError::TypeMismatch {
                        key: std::any::type_name::<K>(),
                        expected: std::any::type_name::<K::Value>(),
                    }
                });
        }
    }

    fn is_current_slot(&self, key: KeyId, slot: &Arc<Slot>) -> bool {
        self.inner
            .slots
            .get(&key)
            .map_or(false, |current| Arc::ptr_eq(current.value(), slot))
    }

    /// True when the slot for `K` already holds an atom
    pub fn contains<K: AtomKey>(&self) -> bool {
        self.inner
            .slots
            .get(&K::id())
            .map_or(false, |slot| slot.get().is_some())
    }

    /// Slot handle for `key`, inserting an empty slot if absent
    fn slot(&self, key: KeyId) -> Arc<Slot> {
        if let Some(slot) = self.inner.slots.get(&key) {
            return Arc::clone(slot.value());
        }
        let entry = self
            .inner
            .slots
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()));
        Arc::clone(entry.value())
    }

    // ========== Structural mutation ==========

    /// Store `atom` under `K`, unconditionally, and advance the version
    ///
    /// Replacing a slot with the atom it already holds still advances the
    /// version. Root-level sinks are notified with the new version after the
    /// swap is visible.
    pub fn replace<K: AtomKey>(&self, atom: Atom<K::Value>) {
        let key = K::id();
        self.inner
            .slots
            .insert(key, Arc::new(OnceCell::with_value(Box::new(atom) as ErasedAtom)));

        let version = Version::next();
        *self.inner.version.write() = version;
        self.inner.replacements.fetch_add(1, Ordering::Relaxed);

        debug!(target: "atomstore::root", root = %self.inner.id, key = %key, version = %version, "Atom replaced");
        self.inner.listeners.notify(&version);
    }

    /// Current version token
    pub fn version(&self) -> Version {
        *self.inner.version.read()
    }

    /// Register a sink invoked with the new version after every `replace`
    pub fn subscribe_changes(
        &self,
        sink: impl Fn(&Version) + Send + Sync + 'static,
    ) -> Subscription {
        let (id, active) = self.inner.listeners.insert(Box::new(sink));
        let owner: Weak<dyn Unsubscribe> = Arc::downgrade(&self.inner) as Weak<dyn Unsubscribe>;
        Subscription::new(id, active, owner)
    }

    // ========== Introspection ==========

    /// Number of slots holding an atom
    pub fn len(&self) -> usize {
        self.inner
            .slots
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// True when no atom has been stored yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counter snapshot
    pub fn stats(&self) -> RootStats {
        RootStats {
            atoms: self.len(),
            constructions: self.inner.constructions.load(Ordering::Relaxed),
            replacements: self.inner.replacements.load(Ordering::Relaxed),
        }
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Root")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("version", &self.version())
            .field("atoms", &self.len())
            .finish()
    }
}

// ============================================================================
// WeakRoot
// ============================================================================

/// Non-owning handle to a root
#[derive(Clone)]
pub struct WeakRoot {
    inner: Weak<RootInner>,
}

impl WeakRoot {
    /// Upgrade to a strong handle if the root is still alive
    pub fn upgrade(&self) -> Option<Root> {
        self.inner.upgrade().map(|inner| Root { inner })
    }
}

impl fmt::Debug for WeakRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakRoot")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
