//! `rxe` is a push-based reactive stream engine for event-driven
//! applications.
//!
//! The crate is built around a small set of pieces:
//!
//! - [`Observable`]: a cold producer that starts a fresh emission for every
//!   subscription and hands back a [`Subscription`] for release and
//!   awaiting.
//! - [`Observer`] / [`Subscriber`]: the three-callback sink contract
//!   (`next`, `error`, `complete`) with the notification protocol enforced
//!   at the sink: at most one terminal notification, nothing after it.
//! - [`ObservableExt`]: composable operators (`map`, `filter`, `scan`,
//!   `pair_with_previous`, `skip`, `merge`, `synchronize`, `subscribe_on`
//!   and the fallible `try_map`/`try_filter`).
//! - [`Scheduler`]: picks the execution context for production work, inline
//!   or on a worker (OS thread or the Tokio blocking pool).
//! - [`EventRelay`]: the hot counterpart, multicasting raised events to the
//!   handlers registered at that moment, without replay.
//!
//! # Example
//!
//! ```no_run
//! use rxe::subscribe::Subscriber;
//! use rxe::{Observable, ObservableExt, Subscribeable};
//!
//! // Sum each odd number in 0..10 with the previous odd one.
//! let mut sums = Observable::range(0, 10)
//!     .filter(|x| x % 2 > 0)
//!     .pair_with_previous()
//!     // The first pair has no previous value and is discarded by
//!     // convention.
//!     .skip(1)
//!     .map(|(previous, current)| previous.map_or(current, |p| p + current));
//!
//! sums.subscribe(Subscriber::new(
//!     |v| println!("sum {}", v),
//!     |e| eprintln!("{}", e),
//!     || println!("done"),
//! ));
//! ```
//!
//! Errors travel through pipelines as `Arc<dyn Error + Send + Sync>`; the
//! engine's own failure conditions are the [`StreamError`] enum. Library
//! diagnostics are emitted through [`tracing`] at trace level.
//!
//! [`Subscription`]: subscribe/struct.Subscription.html
//! [`Subscriber`]: subscribe/struct.Subscriber.html

mod errors;
mod observable;
mod observer;
mod relay;
mod scheduler;
mod subscription;

pub use errors::StreamError;
pub use observable::{GenerateStep, Observable, ObservableExt};
pub use observer::Observer;
pub use relay::EventRelay;
pub use scheduler::{ImmediateScheduler, Scheduler, TaskScheduler, ThreadScheduler};
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};

/// Items for subscribing to observables and managing the resulting
/// subscriptions.
pub mod subscribe {
    pub use crate::subscription::subscribe::{
        Subscribeable, Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
        Unsubscribeable,
    };
}
