//! Resolution Tests
//!
//! - Lazy construction from the key's default rule
//! - Memoization per key identity
//! - Isolation between roots and between keys

use crate::common::*;
use atomstore::{Atom, AtomError, AtomKey, Equality, KeyId, Root};

// ============================================================================
// Lazy Construction
// ============================================================================

#[test]
fn first_resolve_builds_default() {
    init_tracing();
    let root = Root::new();
    assert!(!root.contains::<CounterKey>());

    let counter = root.resolve::<CounterKey>();
    assert_eq!(counter.get(), 0);
    assert!(root.contains::<CounterKey>());
    assert_eq!(root.stats().constructions, 1);
}

#[test]
fn repeated_resolve_returns_same_atom() {
    let root = Root::new();
    let a = root.resolve::<CounterKey>();
    a.set_if_changed(5);

    let b = root.resolve::<CounterKey>();
    assert!(a.ptr_eq(&b));
    assert_eq!(b.get(), 5);
    assert_eq!(root.stats().constructions, 1);
}

#[test]
fn write_through_one_handle_visible_through_other() {
    let root = Root::new();
    let writer = root.resolve::<ProfileKey>();
    let reader = root.resolve::<ProfileKey>();

    writer.update(|p| Profile {
        count: 42,
        ..p.clone()
    });
    assert_eq!(reader.get().count, 42);
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn fresh_roots_are_independent() {
    let app = Root::new();
    let preview = Root::new();

    app.resolve::<CounterKey>().set_if_changed(10);

    assert_eq!(preview.resolve::<CounterKey>().get(), 0);
    assert!(!app.resolve::<CounterKey>().ptr_eq(&preview.resolve::<CounterKey>()));
}

#[test]
fn distinct_keys_never_share_a_slot() {
    let root = Root::new();
    let first = root.resolve::<FirstFlag>();
    let second = root.resolve::<SecondFlag>();

    first.set_if_changed(true);
    assert!(!second.get());
    assert_ne!(KeyId::of::<FirstFlag>(), KeyId::of::<SecondFlag>());
    assert_eq!(root.len(), 2);
}

#[test]
fn builder_presets_replace_default_rule() {
    let root = Root::builder()
        .label("fixture")
        .with_value::<CounterKey>(99)
        .build()
        .unwrap();

    assert_eq!(root.resolve::<CounterKey>().get(), 99);
    assert_eq!(root.stats().constructions, 0);
    assert_eq!(root.label(), Some("fixture"));
}

// ============================================================================
// Aliased Keys
// ============================================================================

/// Shares `CounterKey`'s slot
struct CounterAlias;

impl AtomKey for CounterAlias {
    type Value = i64;

    fn default_value() -> i64 {
        -1
    }

    fn equality() -> Equality<i64> {
        Equality::partial_eq()
    }

    fn id() -> KeyId {
        CounterKey::id()
    }
}

/// Shares `CounterKey`'s slot with the wrong value type
struct BrokenAlias;

impl AtomKey for BrokenAlias {
    type Value = String;

    fn default_value() -> String {
        String::new()
    }

    fn equality() -> Equality<String> {
        Equality::partial_eq()
    }

    fn id() -> KeyId {
        CounterKey::id()
    }
}

#[test]
fn aliased_key_reaches_same_atom() {
    let root = Root::new();
    root.resolve::<CounterKey>().set_if_changed(3);
    let alias = root.resolve::<CounterAlias>();
    assert_eq!(alias.get(), 3);
    assert!(alias.ptr_eq(&root.resolve::<CounterKey>()));
}

#[test]
fn mismatched_alias_reports_type_mismatch() {
    let root = Root::new();
    root.resolve::<CounterKey>();
    match root.try_resolve::<BrokenAlias>() {
        Err(AtomError::TypeMismatch { .. }) => {}
        other => panic!("expected type mismatch, got {:?}", other.map(|a| a.get())),
    }
}

#[test]
fn atoms_outlive_their_root() {
    let atom: Atom<i64> = {
        let root = Root::new();
        root.resolve::<CounterKey>()
    };
    atom.set_if_changed(8);
    assert_eq!(atom.get(), 8);
}
