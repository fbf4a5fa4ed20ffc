//! Process-wide default root
//!
//! Applications that do not scope their state can share one root for the
//! whole process. It is installed explicitly, once, and handed out as an
//! ordinary `Root` handle; every API still takes the root as an argument, the
//! default is only a conventional value to pass.

use super::Root;
use atomstore_core::{AtomError, Result};
use once_cell::sync::OnceCell;
use tracing::debug;

static DEFAULT_ROOT: OnceCell<Root> = OnceCell::new();

/// Install the process-wide default root
///
/// Fails with [`AtomError::DefaultRootInstalled`] on every call after the
/// first successful one.
pub fn install_default_root(root: Root) -> Result<()> {
    let id = root.id();
    DEFAULT_ROOT
        .set(root)
        .map_err(|_| AtomError::DefaultRootInstalled)?;
    debug!(target: "atomstore::root", root = %id, "Default root installed");
    Ok(())
}

/// Handle to the process-wide default root
pub fn default_root() -> Result<Root> {
    DEFAULT_ROOT.get().cloned().ok_or(AtomError::DefaultRootMissing)
}
