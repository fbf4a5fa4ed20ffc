//! Concurrency Tests
//!
//! - Concurrent first resolution builds exactly one atom
//! - Concurrent updates through shared handles lose nothing
//! - Replacements racing with readers stay consistent

use crate::common::*;
use atomstore::{Atom, AtomKey, AtomState, Equality, Root};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

static SLOW_DEFAULTS: AtomicUsize = AtomicUsize::new(0);

struct SlowKey;

impl AtomKey for SlowKey {
    type Value = String;

    fn default_value() -> String {
        SLOW_DEFAULTS.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(25));
        "built".into()
    }

    fn equality() -> Equality<String> {
        Equality::partial_eq()
    }
}

// ============================================================================
// Single Construction
// ============================================================================

#[test]
fn concurrent_first_resolve_builds_once() {
    let root = Root::new();
    let barrier = Arc::new(Barrier::new(16));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let root = root.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                root.resolve::<SlowKey>().id()
            })
        })
        .collect();

    let ids: HashSet<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids.len(), 1, "all threads must see the same atom");
    assert_eq!(SLOW_DEFAULTS.load(Ordering::SeqCst), 1);
}

#[test]
fn different_keys_resolve_in_parallel() {
    let root = Root::new();
    let barrier = Arc::new(Barrier::new(2));

    let slow = {
        let root = root.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            root.resolve::<SlowKey>().get()
        })
    };
    let fast = {
        let root = root.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            root.resolve::<CounterKey>().get()
        })
    };

    assert_eq!(fast.join().unwrap(), 0);
    assert_eq!(slow.join().unwrap(), "built");
}

// ============================================================================
// Shared Writes
// ============================================================================

#[test]
fn concurrent_updates_are_not_lost() {
    let root = Root::new();
    let threads = 8;
    let per_thread = 1000;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let root = root.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let counter = root.resolve::<CounterKey>();
                barrier.wait();
                for _ in 0..per_thread {
                    counter.update(|v| v + 1);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(root.resolve::<CounterKey>().get(), (threads * per_thread) as i64);
}

#[test]
fn readers_see_some_replacement_during_churn() {
    let root = Root::new();
    let barrier = Arc::new(Barrier::new(5));

    let writer = {
        let root = root.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 1..=200 {
                root.replace::<CounterKey>(Atom::new(i));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let root = root.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let state = AtomState::<CounterKey>::new(&root);
                barrier.wait();
                let mut last = 0;
                for _ in 0..200 {
                    let v = state.get();
                    assert!((0..=200).contains(&v));
                    last = v;
                }
                last
            })
        })
        .collect();

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    let state = AtomState::<CounterKey>::new(&root);
    assert_eq!(state.get(), 200);
    assert_eq!(root.stats().replacements, 200);
}
