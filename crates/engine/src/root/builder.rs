//! Root builder for preconfigured roots
//!
//! A root for a particular subtree often starts with some atoms already in
//! place (a preview scope with canned data, a test scope with fixtures).
//! Preset atoms are part of the initial contents: they do not count as
//! replacements and do not advance the version.

use super::config::RootConfig;
use super::{ErasedAtom, Root};
use crate::atom::Atom;
use crate::key::AtomKey;
use atomstore_core::{KeyId, Result};

// ============================================================================
// Root Builder Pattern
// ============================================================================

/// Builder for [`Root`]
///
/// ```rust,ignore
/// let root = Root::builder()
///     .label("preview")
///     .with_value::<CounterKey>(42)
///     .build()?;
/// ```
#[derive(Default)]
pub struct RootBuilder {
    config: RootConfig,
    preset: Vec<(KeyId, ErasedAtom)>,
}

impl RootBuilder {
    /// Create new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    ///
    /// Presets added before or after are kept.
    pub fn config(mut self, config: RootConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the log label
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = Some(label.into());
        self
    }

    /// Pre-allocate storage for `capacity` slots
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Seed `K` with `value`, using the key's equality policy
    pub fn with_value<K: AtomKey>(self, value: K::Value) -> Self {
        self.with_atom::<K>(Atom::with_equality(value, K::equality()))
    }

    /// Seed `K` with a caller-built atom
    ///
    /// Seeding the same key twice keeps the last atom.
    pub fn with_atom<K: AtomKey>(mut self, atom: Atom<K::Value>) -> Self {
        let id = K::id();
        self.preset.retain(|(existing, _)| *existing != id);
        self.preset.push((id, Box::new(atom)));
        self
    }

    /// Validate the configuration and build the root
    pub fn build(self) -> Result<Root> {
        self.config.validate()?;
        Ok(Root::from_parts(&self.config, self.preset))
    }
}
