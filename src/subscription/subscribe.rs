use std::{
    any::Any,
    error::Error,
    future::Future,
    pin::Pin,
    sync::Arc,
    thread::JoinHandle as ThreadJoinHandle,
};

use tokio::runtime;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::observer::Observer;

/// A trait for types that can be subscribed to, allowing consumers to receive
/// values emitted by an observable stream.
pub trait Subscribeable {
    /// The type of items emitted by the observable stream.
    type ObsType;

    /// Subscribes to the observable stream and specifies how to handle
    /// emitted values.
    ///
    /// The `Subscriber` parameter defines the behavior for processing values
    /// emitted by the observable stream. The implementation of this method
    /// should establish the subscription and manage the delivery of values to
    /// the subscriber.
    ///
    /// The returned `Subscription` allows the subscriber to manage the
    /// subscription, such as unsubscribing or awaiting an asynchronous
    /// producer. A valid `Subscription` is returned even when the source is
    /// empty or fails immediately after its terminal notification.
    fn subscribe(&mut self, s: Subscriber<Self::ObsType>) -> Subscription;
}

/// A trait for types that can be unsubscribed, allowing the clean release of
/// resources associated with a subscription.
pub trait Unsubscribeable {
    /// Unsubscribes from a subscription and releases associated resources.
    ///
    /// This also serves as the signal for an asynchronous producer to stop
    /// emitting. After `unsubscribe` returns, no further notification reaches
    /// the subscriber, apart from at most one notification that was already
    /// in flight when the release happened.
    ///
    /// The `Subscription` this is called on is consumed, so a second release
    /// of the same handle is unrepresentable. Release paths that may race
    /// internally share the handle through an `Option` and `take()` it, which
    /// collapses concurrent attempts to a single effective release.
    fn unsubscribe(self);
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type CompleteFn = Box<dyn FnMut() + Send + Sync>;
type ErrorFn = Box<dyn FnMut(Arc<dyn Error + Send + Sync>) + Send + Sync>;

/// A type that acts as an observer, allowing users to handle emitted values,
/// errors and completion when subscribing to an `Observable` or an
/// `EventRelay`.
///
/// Users create a `Subscriber` with the `new` method and provide custom
/// functions to handle the `next`, `error` and `complete` events.
///
/// A `Subscriber` enforces the notification protocol at the sink: once a
/// terminal notification (`error` or `complete`) has been delivered, every
/// subsequent notification is dropped. At most one terminal notification is
/// ever delivered per subscription, no matter how a source misbehaves.
pub struct Subscriber<NextFnType> {
    next_fn: NextFn<NextFnType>,
    complete_fn: Option<CompleteFn>,
    error_fn: Option<ErrorFn>,
    completed: bool,
    errored: bool,
}

impl<NextFnType> Subscriber<NextFnType> {
    /// Creates a new `Subscriber` instance with custom handling functions for
    /// emitted values, errors and completion.
    pub fn new(
        next_fn: impl FnMut(NextFnType) + 'static + Send,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send + Sync,
        complete_fn: impl FnMut() + 'static + Send + Sync,
    ) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: Some(Box::new(complete_fn)),
            error_fn: Some(Box::new(error_fn)),
            completed: false,
            errored: false,
        }
    }

    /// Create a new `Subscriber` with the provided `next` function only.
    ///
    /// The `next` closure is called when the observable emits a new item.
    /// Error and completion notifications are accepted and still close the
    /// stream, but run no user code.
    pub fn on_next(next_fn: impl FnMut(NextFnType) + 'static + Send) -> Self {
        Subscriber {
            next_fn: Box::new(next_fn),
            complete_fn: None,
            error_fn: None,
            completed: false,
            errored: false,
        }
    }

    /// Set the completion function for the `Subscriber`.
    ///
    /// The provided closure will be called when the observable completes its
    /// emission sequence.
    pub fn on_complete(&mut self, complete_fn: impl FnMut() + 'static + Send + Sync) {
        self.complete_fn = Some(Box::new(complete_fn));
    }

    /// Set the error-handling function for the `Subscriber`.
    ///
    /// The provided closure will be called when the observable signals a
    /// failure. It receives the error as `Arc<dyn Error + Send + Sync>`.
    pub fn on_error(
        &mut self,
        error_fn: impl FnMut(Arc<dyn Error + Send + Sync>) + 'static + Send + Sync,
    ) {
        self.error_fn = Some(Box::new(error_fn));
    }

    /// Returns `true` once a terminal notification has been delivered.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.completed || self.errored
    }
}

impl<T> Observer for Subscriber<T> {
    type NextFnType = T;

    fn next(&mut self, v: Self::NextFnType) {
        if self.completed || self.errored {
            return;
        }
        (self.next_fn)(v);
    }

    fn complete(&mut self) {
        if self.completed || self.errored {
            return;
        }
        // Mark before invoking the callback so a re-entrant notification
        // from inside the callback is dropped.
        self.completed = true;
        if let Some(cfn) = &mut self.complete_fn {
            (cfn)();
        }
    }

    fn error(&mut self, observable_error: Arc<dyn Error + Send + Sync>) {
        if self.completed || self.errored {
            return;
        }
        self.errored = true;
        if let Some(efn) = &mut self.error_fn {
            (efn)(observable_error);
        }
    }
}

/// Enumeration representing different types of handles used by a
/// `Subscription` to await asynchronous producers.
pub enum SubscriptionHandle {
    /// No specific handle for task or thread awaiting.
    Nil,

    /// Holds a join handle for awaiting an asynchronous observable using a
    /// Tokio task.
    JoinTask(JoinHandle<()>),

    /// Holds a join handle for awaiting an asynchronous observable using an
    /// OS thread.
    JoinThread(ThreadJoinHandle<()>),
}

/// Represents a subscription to an observable or an event relay, allowing
/// control over the subscription.
///
/// When an observable or relay is subscribed to, it returns a `Subscription`
/// instance. The subscription can be used to unsubscribe and to await
/// asynchronous producers that use Tokio tasks or OS threads.
pub struct Subscription {
    pub(crate) unsubscribe_logic: UnsubscribeLogic,
    pub(crate) subscription_future: SubscriptionHandle,
    pub(crate) runtime_handle: Result<runtime::Handle, runtime::TryCurrentError>,
}

impl Subscription {
    /// Creates a new `Subscription` instance with the specified unsubscribe
    /// logic and subscription handle.
    ///
    /// The `unsubscribe_logic` parameter defines the logic to execute upon
    /// unsubscribing from the observable. See [`UnsubscribeLogic`] for the
    /// available unsubscribe strategies.
    ///
    /// The `subscription_future` parameter holds a handle for awaiting
    /// asynchronous tasks or threads associated with the subscription. See
    /// [`SubscriptionHandle`] for the types of handles.
    ///
    /// [`UnsubscribeLogic`]: enum.UnsubscribeLogic.html
    /// [`SubscriptionHandle`]: enum.SubscriptionHandle.html
    #[must_use]
    pub fn new(
        unsubscribe_logic: UnsubscribeLogic,
        subscription_future: SubscriptionHandle,
    ) -> Self {
        let runtime_handle = tokio::runtime::Handle::try_current();
        Subscription {
            unsubscribe_logic,
            subscription_future,
            runtime_handle,
        }
    }

    /// Awaits the completion of the asynchronous task or thread associated
    /// with this subscription.
    ///
    /// If the observable uses Tokio tasks, this method awaits the task. If
    /// the observable uses OS threads, it awaits the thread.
    ///
    /// # Errors
    ///
    /// Returns an error if joining a thread or awaiting a task used by the
    /// observable fails.
    pub async fn join_concurrent(self) -> Result<(), Box<dyn Any + Send>> {
        match self.subscription_future {
            SubscriptionHandle::JoinTask(task_handle) => {
                let r = task_handle.await;
                r.map_err(|e| Box::new(e) as Box<dyn Any + Send>)
            }
            SubscriptionHandle::JoinThread(thread_handle) => thread_handle.join(),
            SubscriptionHandle::Nil => Ok(()),
        }
    }

    /// Awaits the completion of the asynchronous OS thread associated with
    /// this subscription, blocking the current thread.
    ///
    /// This is useful when using the crate without Tokio in a project, as it
    /// allows awaiting completion without relying on asynchronous constructs.
    ///
    /// # Errors
    ///
    /// Returns an error if joining a thread used by the observable fails.
    ///
    /// # Panics
    ///
    /// If this method is used to await a Tokio task, it will panic. To await
    /// Tokio tasks, use the `join_concurrent().await` method instead.
    pub fn join(self) -> Result<(), Box<dyn Any + Send>> {
        match self.subscription_future {
            SubscriptionHandle::JoinThread(thread_handle) => thread_handle.join(),
            SubscriptionHandle::Nil => Ok(()),
            SubscriptionHandle::JoinTask(_) => {
                panic!("handle should be an OS thread handle but it is a Tokio task handle instead; when working with Tokio, use `join_concurrent().await` to await the completion of observables")
            }
        }
    }
}

impl Unsubscribeable for Subscription {
    fn unsubscribe(self) {
        trace!("subscription released");
        self.unsubscribe_logic.unsubscribe(self.runtime_handle);
    }
}

/// Enumerates various unsubscribe logic options for a subscription.
pub enum UnsubscribeLogic {
    /// No specific unsubscribe logic.
    Nil,

    /// If one subscription depends on another. The wrapped subscription's
    /// unsubscribe will be called upon unsubscribing.
    Wrapped(Box<Subscription>),

    /// Unsubscribe logic defined by a function.
    Logic(Box<dyn FnOnce() + Send>),

    /// Asynchronous unsubscribe logic represented by a future. Use if you
    /// need to spawn Tokio tasks or `.await` as a part of the unsubscribe
    /// logic.
    Future(Pin<Box<dyn Future<Output = ()> + Send>>),
}

impl UnsubscribeLogic {
    fn unsubscribe(
        mut self,
        runtime_handle: Result<runtime::Handle, runtime::TryCurrentError>,
    ) -> Self {
        match self {
            UnsubscribeLogic::Nil => (),
            UnsubscribeLogic::Logic(fnc) => {
                fnc();
                self = Self::Nil;
            }
            UnsubscribeLogic::Wrapped(subscription) => {
                subscription.unsubscribe();
                self = Self::Nil;
            }
            UnsubscribeLogic::Future(future) => {
                match runtime_handle {
                    Ok(handle) => {
                        handle.spawn(async {
                            future.await;
                        });
                    }
                    e @ Err(_) => {
                        e.expect(
                            "observable that uses Tokio tasks is called outside of Tokio runtime",
                        );
                    }
                }
                self = Self::Nil;
            }
        }
        self
    }
}
