//! Accessor Tests
//!
//! Read/write contract shared by `AtomValue` and `AtomState`: plain writes,
//! custom setters, compound values and the equality short-circuit.

use crate::common::*;
use atomstore::{AtomState, AtomValue, Root, Scope};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Plain Writes
// ============================================================================

#[test]
fn value_accessor_is_mutable() {
    let root = Root::new();
    let counter = AtomValue::<CounterKey>::new(&root);
    counter.set(42);
    assert_eq!(counter.get(), 42);
    assert_eq!(root.resolve::<CounterKey>().get(), 42);
}

#[test]
fn state_accessor_is_mutable() {
    let root = Root::new();
    let counter = AtomState::<CounterKey>::new(&root);
    counter.set(42);
    assert_eq!(counter.get(), 42);
}

// ============================================================================
// Custom Setter
// ============================================================================

fn eleven_becomes_one_eleven(new: i64, _old: &i64) -> i64 {
    if new == 11 {
        111
    } else {
        new
    }
}

#[test]
fn custom_setter_transforms_write() {
    let root = Root::new();
    let counter = AtomValue::<CounterKey>::new(&root).with_setter(eleven_becomes_one_eleven);

    counter.set(11);
    assert_eq!(counter.get(), 111);

    counter.set(42);
    assert_eq!(counter.get(), 42);
}

#[test]
fn custom_setter_on_state_accessor() {
    let root = Root::new();
    let counter = AtomState::<CounterKey>::new(&root).with_setter(eleven_becomes_one_eleven);
    counter.set(11);
    assert_eq!(root.resolve::<CounterKey>().get(), 111);
}

#[test]
fn custom_setter_result_passes_equality_gate() {
    let root = Root::new();
    root.resolve::<CounterKey>().set_if_changed(111);
    let counter = AtomValue::<CounterKey>::new(&root).with_setter(eleven_becomes_one_eleven);

    let hits = Arc::new(AtomicUsize::new(0));
    let _sub = {
        let hits = Arc::clone(&hits);
        counter.atom().subscribe(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    };

    // 11 maps to 111, which is already stored
    assert!(!counter.set(11));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn setter_can_clamp_against_old_value() {
    let root = Root::new();
    let monotonic = AtomState::<CounterKey>::new(&root).with_setter(|new, old| new.max(*old));

    monotonic.set(5);
    monotonic.set(3);
    assert_eq!(monotonic.get(), 5);
}

// ============================================================================
// Compound Values
// ============================================================================

#[test]
fn modify_single_field() {
    let root = Root::new();
    let profile = AtomState::<ProfileKey>::new(&root);

    assert!(profile.modify(|p| p.count = 42));
    assert_eq!(profile.get().count, 42);
    assert_eq!(root.resolve::<ProfileKey>().get().count, 42);

    // Same field value again: no change
    assert!(!profile.modify(|p| p.count = 42));
}

#[test]
fn observer_sees_field_edit() {
    let root = Root::new();
    let names = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let profile = {
        let names = Arc::clone(&names);
        AtomState::<ProfileKey>::new(&root).observe(move |p| names.lock().push(p.name.clone()))
    };

    profile.modify(|p| p.name = "grace".into());
    assert_eq!(*names.lock(), vec!["grace".to_string()]);
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn accessors_in_different_scopes_are_isolated() {
    let app = Root::new();
    let preview = Root::builder().with_value::<CounterKey>(7).build().unwrap();

    let in_app = AtomValue::<CounterKey>::new(&app);
    let in_preview = AtomValue::<CounterKey>::new(&preview);

    in_app.set(1);
    assert_eq!(in_preview.get(), 7);
}

#[test]
fn value_accessor_resolves_lazily_from_scope() {
    let scope = Scope::new(Root::new());
    let counter = AtomValue::<CounterKey>::new(&scope);

    // Not resolved yet, so the reassignment is picked up
    let target = Root::new();
    scope.assign(target.clone());
    counter.set(4);
    assert_eq!(target.resolve::<CounterKey>().get(), 4);
}
