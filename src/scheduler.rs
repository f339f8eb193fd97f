//! Execution-context selection for producer work.
//!
//! A [`Scheduler`] decides where a scheduled action runs: inline on the
//! caller, on a dedicated OS thread, or on the Tokio blocking pool. The
//! engine owns no thread pool of its own; `subscribe_on` hands the subscribe
//! call, and with it the production loop, to whichever scheduler the caller
//! picked. Workers may sleep between emissions without blocking other
//! producers.

use tokio::task;
use tracing::trace;

use crate::subscription::subscribe::SubscriptionHandle;

/// Selects the execution context that runs a unit of producer work.
pub trait Scheduler {
    /// Runs `action` on this scheduler's execution context.
    ///
    /// Returns a handle that can be used to await the worker where one
    /// exists; the immediate scheduler has nothing to await and returns
    /// [`SubscriptionHandle::Nil`].
    fn schedule(&self, action: Box<dyn FnOnce() + Send>) -> SubscriptionHandle;
}

/// Runs actions inline on the calling thread.
///
/// Scheduling blocks the caller until the action returns, exactly as if the
/// action had been called directly.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, action: Box<dyn FnOnce() + Send>) -> SubscriptionHandle {
        action();
        SubscriptionHandle::Nil
    }
}

/// Runs every scheduled action on its own OS thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule(&self, action: Box<dyn FnOnce() + Send>) -> SubscriptionHandle {
        trace!("scheduling action on a new worker thread");
        SubscriptionHandle::JoinThread(std::thread::spawn(action))
    }
}

/// Runs scheduled actions on the Tokio blocking pool.
///
/// Scheduled actions are synchronous production loops, so they go through
/// `spawn_blocking` rather than an async task.
///
/// # Panics
///
/// Scheduling panics if called outside of a Tokio runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskScheduler;

impl Scheduler for TaskScheduler {
    fn schedule(&self, action: Box<dyn FnOnce() + Send>) -> SubscriptionHandle {
        trace!("scheduling action on the tokio blocking pool");
        SubscriptionHandle::JoinTask(task::spawn_blocking(action))
    }
}
