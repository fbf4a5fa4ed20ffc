//! Error types for atomstore
//!
//! The atom core is almost entirely infallible: unset keys resolve through
//! their default rule, writes never fail, and there is no "not found" state.
//! What remains are programming errors (slot type mismatch), misuse of the
//! process-wide default root, configuration problems, and detached dispatch
//! without a runtime.
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use thiserror::Error;

/// Result type alias for atomstore operations
pub type Result<T> = std::result::Result<T, AtomError>;

/// Error types for atomstore
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AtomError {
    /// A root slot holds an atom whose value type differs from the one the
    /// resolving key declares. Only reachable when two keys alias the same
    /// slot with different value types.
    #[error("type mismatch for key {key}: slot does not hold Atom<{expected}>")]
    TypeMismatch {
        /// Type name of the resolving key
        key: &'static str,
        /// Value type the key declares
        expected: &'static str,
    },

    /// The process-wide default root can only be installed once
    #[error("default root already installed")]
    DefaultRootInstalled,

    /// The process-wide default root was read before it was installed
    #[error("default root not installed")]
    DefaultRootMissing,

    /// Root configuration failed parsing or validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Detached dispatch needs a tokio runtime to spawn onto
    #[error("no async runtime available for detached dispatch")]
    NoRuntime,
}

impl AtomError {
    /// Create an `InvalidConfig` error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        AtomError::InvalidConfig(msg.into())
    }

    /// True for errors that indicate a bug in the caller rather than a
    /// runtime condition
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            AtomError::TypeMismatch { .. } | AtomError::DefaultRootInstalled
        )
    }
}
