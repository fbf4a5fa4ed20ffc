//! Actions: asynchronous units of work against a root
//!
//! An action receives the root it was dispatched against and may read,
//! write, or replace any atom in it. Its output (including any error type
//! the action chooses) is handed back to the dispatcher's caller unchanged.

use crate::root::Root;
use std::fmt;
use std::future::Future;

/// Asynchronous operation performed against a root
///
/// ```rust,ignore
/// struct IncrementCounter(i64);
///
/// impl Action for IncrementCounter {
///     type Output = ();
///
///     async fn perform(&self, root: &Root) {
///         root.resolve::<CounterKey>().update(|v| v + self.0);
///     }
/// }
/// ```
pub trait Action: Send + Sync + 'static {
    /// Value produced when the action completes
    type Output: Send + 'static;

    /// Run the action against `root`
    fn perform(&self, root: &Root) -> impl Future<Output = Self::Output> + Send;
}

/// [`Action`] built from a closure; see [`action_fn`]
pub struct ActionFn<F> {
    f: F,
}

/// Turn `|root: Root| async move { ... }` into an [`Action`]
pub fn action_fn<F, Fut>(f: F) -> ActionFn<F>
where
    F: Fn(Root) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: Send + 'static,
{
    ActionFn { f }
}

impl<F, Fut> Action for ActionFn<F>
where
    F: Fn(Root) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: Send + 'static,
{
    type Output = Fut::Output;

    fn perform(&self, root: &Root) -> impl Future<Output = Self::Output> + Send {
        (self.f)(root.clone())
    }
}

impl<F> fmt::Debug for ActionFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionFn")
    }
}
