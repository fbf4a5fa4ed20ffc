//! Reactive state engine for atomstore
//!
//! This crate provides the moving parts:
//! - Atom: observable mutable cell with an equality-gated write path
//! - Root: keyed registry building atoms lazily from their key's default rule
//! - Accessors: `AtomValue` (memoized) and `AtomState` (follows replacements)
//! - Dispatcher: runs asynchronous actions against a captured root
//!
//! Identity, version and error types live in `atomstore-core` and are
//! re-exported here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod accessor;
pub mod action;
pub mod atom;
pub mod dispatcher;
pub mod key;
pub mod root;
mod subscription;

pub use accessor::{AtomState, AtomValue, RootSource, Scope, Setter};
pub use action::{action_fn, Action, ActionFn};
pub use atom::{Atom, WeakAtom};
pub use dispatcher::Dispatcher;
pub use key::AtomKey;
pub use root::{default_root, install_default_root, Root, RootBuilder, RootConfig, RootStats, WeakRoot};
pub use subscription::Subscription;

pub use atomstore_core::{AtomError, AtomId, Equality, KeyId, Result, RootId, Version};
