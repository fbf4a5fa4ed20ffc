//! atomstore - reactive, dependency-injected state atoms
//!
//! Application state is split into atoms: small observable cells, each
//! addressed by a key type that also supplies its default value. Atoms live
//! in a root; a subtree of the application can be given its own root to
//! isolate or preconfigure its state.
//!
//! # Quick Start
//!
//! ```ignore
//! use atomstore::{action_fn, AtomKey, AtomState, Dispatcher, Equality, Root};
//!
//! struct Counter;
//!
//! impl AtomKey for Counter {
//!     type Value = i64;
//!     fn default_value() -> i64 { 0 }
//!     fn equality() -> Equality<i64> { Equality::partial_eq() }
//! }
//!
//! let root = Root::new();
//! let counter = AtomState::<Counter>::new(&root).observe(|v| println!("counter = {}", v));
//! counter.set(1); // prints "counter = 1"
//! counter.set(1); // equal, nothing happens
//!
//! let dispatcher = Dispatcher::new(root.clone());
//! dispatcher
//!     .dispatch(action_fn(|root: Root| async move {
//!         root.resolve::<Counter>().update(|v| v + 10);
//!     }))
//!     .await;
//! assert_eq!(counter.get(), 11);
//! ```
//!
//! # Architecture
//!
//! - `atomstore-core`: identities, version tokens, equality policies, errors
//! - `atomstore-engine`: atoms, roots, accessors, actions and the dispatcher

pub use atomstore_engine::*;
