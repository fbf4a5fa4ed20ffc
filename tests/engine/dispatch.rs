//! Dispatch Tests
//!
//! - Awaited dispatch returns the action's output
//! - The root is captured when `dispatch` is called
//! - Detached dispatch runs on the ambient or configured runtime
//! - Action errors reach the caller unchanged

use crate::common::*;
use atomstore::{action_fn, AtomError, AtomState, Dispatcher, Root};

#[tokio::test]
async fn increment_then_decrement() {
    init_tracing();
    let root = Root::new();
    let dispatcher = Dispatcher::new(root.clone());

    dispatcher.dispatch(IncrementCounter(5)).await;
    assert_eq!(root.resolve::<CounterKey>().get(), 5);

    dispatcher.dispatch(DecrementCounter(2)).await;
    assert_eq!(root.resolve::<CounterKey>().get(), 3);
}

#[tokio::test]
async fn sequential_dispatches_accumulate() {
    let root = Root::new();
    let dispatcher = Dispatcher::new(root.clone());
    for _ in 0..10 {
        dispatcher.dispatch(IncrementCounter(1)).await;
    }
    assert_eq!(root.resolve::<CounterKey>().get(), 10);
}

#[tokio::test]
async fn concurrent_detached_dispatches_accumulate() {
    let root = Root::new();
    let dispatcher = Dispatcher::new(root.clone());

    let handles: Vec<_> = (0..50)
        .map(|_| dispatcher.dispatch_detached(IncrementCounter(2)).unwrap())
        .collect();
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(root.resolve::<CounterKey>().get(), 100);
}

#[tokio::test]
async fn observing_accessor_sees_action_writes() {
    let root = Root::new();
    let counter = AtomState::<CounterKey>::new(&root);
    let dispatcher = Dispatcher::new(root.clone());

    dispatcher.dispatch(IncrementCounter(7)).await;
    assert_eq!(counter.get(), 7);
}

#[tokio::test]
async fn root_is_captured_at_call_time() {
    let first = Root::new();
    let second = Root::new();
    let dispatcher = Dispatcher::new(first.clone());

    let pending = dispatcher.dispatch(IncrementCounter(1));
    dispatcher.assign(second.clone());
    let next = dispatcher.dispatch(IncrementCounter(10));

    next.await;
    pending.await;

    assert_eq!(first.resolve::<CounterKey>().get(), 1);
    assert_eq!(second.resolve::<CounterKey>().get(), 10);
}

#[tokio::test]
async fn errors_propagate_to_caller() {
    let root = Root::builder().with_value::<CounterKey>(10).build().unwrap();
    let dispatcher = Dispatcher::new(root.clone());

    assert_eq!(dispatcher.dispatch(Withdraw(4)).await, Ok(6));
    assert_eq!(
        dispatcher.dispatch(Withdraw(7)).await,
        Err(WithdrawError::Insufficient {
            balance: 6,
            requested: 7
        })
    );
    assert_eq!(root.resolve::<CounterKey>().get(), 6);
}

#[tokio::test]
async fn action_may_replace_atoms() {
    let root = Root::new();
    let state = AtomState::<CounterKey>::new(&root);
    state.set(1);
    let dispatcher = Dispatcher::new(root.clone());

    let reset = action_fn(|root: Root| async move {
        root.replace::<CounterKey>(atomstore::Atom::new(-5));
    });
    dispatcher.dispatch(reset).await;

    assert_eq!(state.get(), -5);
}

#[tokio::test]
async fn dropped_join_handle_still_runs() {
    let root = Root::new();
    let dispatcher = Dispatcher::new(root.clone());

    drop(dispatcher.dispatch_detached(IncrementCounter(3)).unwrap());

    for _ in 0..100 {
        if root.resolve::<CounterKey>().get() == 3 {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("detached action never ran");
}

#[test]
fn detached_without_runtime_is_an_error() {
    let dispatcher = Dispatcher::new(Root::new());
    let err = dispatcher.dispatch_detached(IncrementCounter(1)).unwrap_err();
    assert_eq!(err, AtomError::NoRuntime);
}
