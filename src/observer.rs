//! The three-callback sink contract consumed by every observable source.

use std::{error::Error, sync::Arc};

/// A sink of `next`, `error` and `complete` notifications.
///
/// A well-behaved source calls `next` zero or more times, then at most one
/// of `error` or `complete`: never both, and never another notification
/// after either. Implementations must tolerate being invoked from whichever
/// worker context happens to drive the producing side; any side effects they
/// perform are their own responsibility.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn complete(&mut self);
    fn error(&mut self, _: Arc<dyn Error + Send + Sync>);
}
