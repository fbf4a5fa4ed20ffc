//! Root version token
//!
//! A root carries a `Version` that advances whenever an atom is swapped out
//! wholesale. Accessors remember the version they resolved at and re-resolve
//! when the root reports a different one.
//!
//! Tokens come from a single process-wide counter, so two roots never report
//! the same version. An accessor that moves from one root to another therefore
//! sees a version change too. Callers should only ever compare tokens for
//! inequality; the numeric order is an implementation detail.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

/// Opaque version token of a root
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(u64);

impl Version {
    /// Allocate a fresh token, distinct from every token handed out before
    pub fn next() -> Self {
        Version(NEXT_VERSION.fetch_add(1, Ordering::SeqCst))
    }

    /// Raw token value, for logging
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
