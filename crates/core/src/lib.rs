//! Core types for atomstore
//!
//! This crate defines the foundational types used throughout the system:
//! - KeyId: type-derived identity of an atom key
//! - RootId / AtomId: process-unique diagnostic identities
//! - Version: opaque root version token used for accessor cache invalidation
//! - Equality: the equality short-circuit policy applied on writes
//! - AtomError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod equality;
pub mod error;
pub mod types;
pub mod version;

pub use equality::Equality;
pub use error::{AtomError, Result};
pub use types::{AtomId, KeyId, RootId};
pub use version::Version;
