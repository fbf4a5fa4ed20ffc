//! Dispatcher: runs actions against the root bound to its scope
//!
//! The root is captured synchronously when `dispatch` is called. Reassigning
//! the dispatcher afterwards does not redirect actions already dispatched.
//!
//! Two entry points:
//! - `dispatch` returns a future the caller awaits for the action's output
//! - `dispatch_detached` spawns onto a tokio runtime and returns the
//!   `JoinHandle`, which callers may drop for fire-and-forget

use crate::accessor::Scope;
use crate::action::Action;
use crate::root::{default_root, Root};
use atomstore_core::{AtomError, Result};
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Action runner bound to a (reassignable) root
#[derive(Debug, Clone)]
pub struct Dispatcher {
    scope: Scope,
    runtime: Option<Handle>,
}

impl Dispatcher {
    /// Dispatcher with its own scope bound to `root`
    pub fn new(root: Root) -> Self {
        Self {
            scope: Scope::new(root),
            runtime: None,
        }
    }

    /// Dispatcher sharing `scope` with other consumers
    ///
    /// Reassigning the scope anywhere redirects subsequent dispatches.
    pub fn scoped(scope: &Scope) -> Self {
        Self {
            scope: scope.clone(),
            runtime: None,
        }
    }

    /// Dispatcher bound to the process-wide default root
    pub fn from_default() -> Result<Self> {
        Ok(Self::new(default_root()?))
    }

    /// Spawn detached actions on `handle` instead of the ambient runtime
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Bind subsequent dispatches to `root`
    ///
    /// No-op (returns `false`) when `root` is already bound.
    pub fn assign(&self, root: Root) -> bool {
        self.scope.assign(root)
    }

    /// Root the next dispatch will use
    pub fn root(&self) -> Root {
        self.scope.current()
    }

    /// Scope this dispatcher reads its root from
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Run `action` against the currently bound root
    ///
    /// The root is captured now; the returned future owns it.
    pub fn dispatch<A: Action>(&self, action: A) -> impl Future<Output = A::Output> + Send + 'static {
        let root = self.scope.current();
        debug!(
            target: "atomstore::dispatch",
            root = %root.id(),
            action = std::any::type_name::<A>(),
            "Action dispatched"
        );
        async move {
            let output = action.perform(&root).await;
            debug!(target: "atomstore::dispatch", root = %root.id(), "Action completed");
            output
        }
    }

    /// Spawn `action` and return its join handle
    ///
    /// Uses the runtime set with [`Dispatcher::with_runtime`], else the
    /// runtime the caller is running in. Fails with [`AtomError::NoRuntime`]
    /// when neither exists.
    pub fn dispatch_detached<A: Action>(&self, action: A) -> Result<JoinHandle<A::Output>> {
        let handle = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| AtomError::NoRuntime)?,
        };
        let task = self.dispatch(action);
        Ok(handle.spawn(task))
    }
}
