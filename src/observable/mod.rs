//! The `observable` module provides the building blocks for creating and
//! manipulating observables, allowing for reactive programming in Rust.

use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use tracing::trace;

use crate::scheduler::Scheduler;
use crate::subscription::subscribe::{
    Subscribeable, Subscriber, Subscription, SubscriptionHandle, Unsubscribeable,
};
use crate::{observer::Observer, subscription::subscribe::UnsubscribeLogic};

mod generate;

pub use generate::GenerateStep;

/// The `Observable` struct represents a source of values that can be observed
/// and transformed.
///
/// An `Observable` wraps a subscribe function. Subscribing runs that function
/// with the given [`Subscriber`], which starts a fresh production for this
/// subscription: observables are cold unless documented otherwise (see
/// [`EventRelay`] for the hot counterpart).
///
/// # Example: basic synchronous `Observable`
///
/// This simple `Observable` emits values and completes. It returns an empty
/// `Subscription`, making it unable to be unsubscribed from. The production
/// loop runs on the caller's thread; use [`subscribe_on`] to move it to a
/// worker.
///
/// ```no_run
/// use rxe::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
/// use rxe::{Observable, Observer, Subscribeable};
///
/// let mut numbers = Observable::new(|mut subscriber| {
///     for i in 0..5 {
///         subscriber.next(i);
///     }
///     subscriber.complete();
///
///     Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
/// });
///
/// let observer = Subscriber::new(
///     |v| println!("Emitted {}", v),
///     |e| eprintln!("Failed: {}", e),
///     || println!("Completed"),
/// );
///
/// // Observables are cold: comment this line out and nothing is emitted.
/// numbers.subscribe(observer);
/// ```
///
/// # Example: asynchronous `Observable` with `unsubscribe`
///
/// Emits values from an OS thread and returns a `Subscription` that can stop
/// the background emission. The channel carries the release signal into the
/// producer loop; after the signal lands, no further values reach the
/// subscriber.
///
/// ```no_run
/// use std::{
///     sync::{Arc, Mutex},
///     time::Duration,
/// };
///
/// use rxe::subscribe::{
///     Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic, Unsubscribeable,
/// };
/// use rxe::{Observable, Observer, Subscribeable};
///
/// let mut observable = Observable::new(|mut o: Subscriber<_>| {
///     let done = Arc::new(Mutex::new(false));
///     let done_c = Arc::clone(&done);
///     let (tx, rx) = std::sync::mpsc::channel();
///
///     std::thread::spawn(move || {
///         if let Ok(stop) = rx.recv() {
///             *done_c.lock().unwrap() = stop;
///         }
///     });
///
///     let join_handle = std::thread::spawn(move || {
///         for i in 0..1000 {
///             if *done.lock().unwrap() {
///                 break;
///             }
///             o.next(i);
///             std::thread::sleep(Duration::from_millis(1));
///         }
///         o.complete();
///     });
///
///     Subscription::new(
///         UnsubscribeLogic::Logic(Box::new(move || {
///             if tx.send(true).is_err() {
///                 eprintln!("receiver dropped");
///             }
///         })),
///         SubscriptionHandle::JoinThread(join_handle),
///     )
/// });
///
/// let subscription = observable.subscribe(Subscriber::on_next(|v| println!("{}", v)));
///
/// // Do something else, then stop the emission.
/// subscription.unsubscribe();
/// ```
///
/// [`Subscriber`]: ../subscribe/struct.Subscriber.html
/// [`EventRelay`]: ../struct.EventRelay.html
/// [`subscribe_on`]: trait.ObservableExt.html#method.subscribe_on
pub struct Observable<T> {
    subscribe_fn: Box<dyn FnMut(Subscriber<T>) -> Subscription + Send + Sync>,
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided subscribe function.
    ///
    /// The closure `sf` defines the behavior of the `Observable` when it is
    /// subscribed to: it receives the `Subscriber`, drives notifications into
    /// it (synchronously or from a spawned worker) and returns a
    /// `Subscription` carrying the unsubscribe logic and, for asynchronous
    /// sources, a handle to await the producer.
    pub fn new(sf: impl FnMut(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }
}

/// The `ObservableExt` trait provides a set of extension methods that can be
/// applied to observables to transform and manipulate their behavior.
///
/// Every operator wraps `subscribe`: subscribing to the operator's output
/// subscribes to the upstream source with a derived `Subscriber` that applies
/// the transform before forwarding downstream.
pub trait ObservableExt<T: 'static>: Subscribeable<ObsType = T> {
    /// Transforms the items emitted by the observable using a transformation
    /// function.
    ///
    /// The transformation function `f` is applied to each item emitted by the
    /// observable, and the resulting value is emitted by the resulting
    /// observable. Error and completion notifications pass through unchanged.
    fn map<U, F>(mut self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: (FnOnce(T) -> U) + Copy + Sync + Send + 'static,
        U: 'static,
    {
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let u = Subscriber::new(
                move |v| {
                    let t = f(v);
                    o_shared.lock().unwrap().next(t);
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Transforms emitted items with a fallible function.
    ///
    /// `Ok` values are forwarded as `next`. The first `Err` is forwarded as
    /// the `error` notification and the upstream subscription is released, so
    /// an asynchronous source stops producing. For a source that emits
    /// synchronously during `subscribe`, the release is best-effort: the
    /// upstream handle only exists once `subscribe` returns, but the terminal
    /// gate already drops everything the source keeps pushing.
    fn try_map<U, F>(mut self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: FnMut(T) -> Result<U, Arc<dyn Error + Send + Sync>> + Sync + Send + 'static,
        U: 'static,
    {
        let f = Arc::new(Mutex::new(f));
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);
            let f = Arc::clone(&f);

            let upstream: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let upstream_failed = Arc::clone(&upstream);

            let u = Subscriber::new(
                move |v| {
                    let mapped = f.lock().unwrap()(v);
                    match mapped {
                        Ok(t) => o_shared.lock().unwrap().next(t),
                        Err(e) => {
                            o_shared.lock().unwrap().error(e);
                            if let Some(s) = upstream_failed.lock().unwrap().take() {
                                s.unsubscribe();
                            }
                        }
                    }
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );

            let mut unsubscriber = self.subscribe(u);
            let handle = unsubscriber.subscription_future;
            unsubscriber.subscription_future = SubscriptionHandle::Nil;
            *upstream.lock().unwrap() = Some(unsubscriber);

            let upstream_released = Arc::clone(&upstream);
            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    if let Some(s) = upstream_released.lock().unwrap().take() {
                        s.unsubscribe();
                    }
                })),
                handle,
            )
        })
    }

    /// Filters the items emitted by the observable based on a predicate
    /// function.
    ///
    /// Only items for which the predicate function returns `true` will be
    /// emitted by the resulting observable.
    fn filter<P>(mut self, predicate: P) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        P: (FnOnce(&T) -> bool) + Copy + Sync + Send + 'static,
    {
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let u = Subscriber::new(
                move |v| {
                    if predicate(&v) {
                        o_shared.lock().unwrap().next(v);
                    }
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Filters with a fallible predicate.
    ///
    /// A predicate failure is forwarded as the `error` notification and the
    /// upstream subscription is released, with the same best-effort caveat
    /// for synchronous sources as [`try_map`].
    ///
    /// [`try_map`]: trait.ObservableExt.html#method.try_map
    fn try_filter<P>(mut self, predicate: P) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        P: FnMut(&T) -> Result<bool, Arc<dyn Error + Send + Sync>> + Sync + Send + 'static,
    {
        let predicate = Arc::new(Mutex::new(predicate));
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);
            let predicate = Arc::clone(&predicate);

            let upstream: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
            let upstream_failed = Arc::clone(&upstream);

            let u = Subscriber::new(
                move |v| {
                    let keep = predicate.lock().unwrap()(&v);
                    match keep {
                        Ok(true) => o_shared.lock().unwrap().next(v),
                        Ok(false) => (),
                        Err(e) => {
                            o_shared.lock().unwrap().error(e);
                            if let Some(s) = upstream_failed.lock().unwrap().take() {
                                s.unsubscribe();
                            }
                        }
                    }
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );

            let mut unsubscriber = self.subscribe(u);
            let handle = unsubscriber.subscription_future;
            unsubscriber.subscription_future = SubscriptionHandle::Nil;
            *upstream.lock().unwrap() = Some(unsubscriber);

            let upstream_released = Arc::clone(&upstream);
            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    if let Some(s) = upstream_released.lock().unwrap().take() {
                        s.unsubscribe();
                    }
                })),
                handle,
            )
        })
    }

    /// Skips the first `n` items emitted by the observable and then emits the
    /// rest unchanged.
    ///
    /// Error and completion notifications are always forwarded. If `n` is
    /// greater than or equal to the total number of items, only the terminal
    /// notification is observed.
    fn skip(mut self, n: usize) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            let mut n = n;
            let u = Subscriber::new(
                move |v| {
                    if n > 0 {
                        n -= 1;
                        return;
                    }
                    o_shared.lock().unwrap().next(v);
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Emits the running accumulation of upstream values.
    ///
    /// The accumulator starts at `seed`; for every upstream item the operator
    /// computes `acc = f(acc, item)` and forwards the new accumulator value
    /// downstream. Each subscription accumulates independently, starting over
    /// from `seed`.
    fn scan<U, F>(mut self, seed: U, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: FnMut(U, T) -> U + Sync + Send + 'static,
        U: Clone + Sync + Send + 'static,
    {
        let f = Arc::new(Mutex::new(f));
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);
            let f = Arc::clone(&f);

            // Fresh accumulator per subscription.
            let mut acc = Some(seed.clone());

            let u = Subscriber::new(
                move |v| {
                    if let Some(previous) = acc.take() {
                        let current = f.lock().unwrap()(previous, v);
                        acc = Some(current.clone());
                        o_shared.lock().unwrap().next(current);
                    }
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Pairs every emitted value with the value that preceded it.
    ///
    /// Emits `(previous, current)` tuples where `previous` is `None` for the
    /// very first upstream value. That first `(None, first)` pair is
    /// synthetic; callers that only want real pairs chain `skip(1)` after
    /// this operator:
    ///
    /// ```text
    /// source.pair_with_previous().skip(1)
    /// ```
    ///
    /// The sentinel is an explicit `Option` rather than a type default, so a
    /// forgotten `skip(1)` shows up as a visibly synthetic pair instead of a
    /// plausible-looking bogus one.
    fn pair_with_previous(mut self) -> Observable<(Option<T>, T)>
    where
        Self: Sized + Send + Sync + 'static,
        T: Clone + Send + 'static,
    {
        Observable::new(move |o| {
            let o_shared = Arc::new(Mutex::new(o));
            let o_cloned_e = Arc::clone(&o_shared);
            let o_cloned_c = Arc::clone(&o_shared);

            // The scan state: last value seen, None until the first emit.
            let mut previous: Option<T> = None;

            let u = Subscriber::new(
                move |v: T| {
                    let pair = (previous.replace(v.clone()), v);
                    o_shared.lock().unwrap().next(pair);
                },
                move |observable_error| {
                    o_cloned_e.lock().unwrap().error(observable_error);
                },
                move || {
                    o_cloned_c.lock().unwrap().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Merges the current observable with a vector of observables, emitting
    /// items from all of them concurrently.
    ///
    /// Every `next` from any source is forwarded as soon as it arrives, in
    /// arrival order. The merged observable completes exactly once, after ALL
    /// sources have completed. The first source to fail terminates the merged
    /// stream: its error is forwarded immediately and every other upstream
    /// subscription is released.
    fn merge(mut self, mut sources: Vec<Observable<T>>) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        fn fan_in<S: 'static>(
            downstream: &Arc<Mutex<Subscriber<S>>>,
            remaining: &Arc<Mutex<usize>>,
            subscriptions: &Arc<Mutex<Option<Vec<Subscription>>>>,
        ) -> Subscriber<S> {
            let d_next = Arc::clone(downstream);
            let d_error = Arc::clone(downstream);
            let d_complete = Arc::clone(downstream);
            let remaining = Arc::clone(remaining);
            let subscriptions = Arc::clone(subscriptions);

            Subscriber::new(
                move |v| {
                    d_next.lock().unwrap().next(v);
                },
                move |observable_error| {
                    // First failing source wins; the downstream terminal gate
                    // drops anything arriving after this.
                    d_error.lock().unwrap().error(observable_error);
                    let taken = subscriptions.lock().unwrap().take();
                    if let Some(subs) = taken {
                        trace!("merge: source failed, releasing remaining subscriptions");
                        for s in subs {
                            s.unsubscribe();
                        }
                    }
                },
                move || {
                    let mut left = remaining.lock().unwrap();
                    *left -= 1;
                    let all_done = *left == 0;
                    drop(left);
                    if all_done {
                        d_complete.lock().unwrap().complete();
                    }
                },
            )
        }

        Observable::new(move |o| {
            let downstream = Arc::new(Mutex::new(o));
            // Completion countdown, one slot per upstream. Decremented under
            // the lock so racing completions cannot double-complete.
            let remaining = Arc::new(Mutex::new(sources.len() + 1));
            let subscriptions: Arc<Mutex<Option<Vec<Subscription>>>> =
                Arc::new(Mutex::new(Some(Vec::with_capacity(sources.len() + 1))));

            let store = |subscription: Subscription| {
                let mut slot = subscriptions.lock().unwrap();
                match slot.as_mut() {
                    Some(subs) => subs.push(subscription),
                    // A source already failed while we were still
                    // subscribing; release the straggler right away.
                    None => subscription.unsubscribe(),
                }
            };

            store(self.subscribe(fan_in(&downstream, &remaining, &subscriptions)));
            for source in &mut sources {
                store(source.subscribe(fan_in(&downstream, &remaining, &subscriptions)));
            }
            drop(store);

            let subscriptions = Arc::clone(&subscriptions);
            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    if let Some(subs) = subscriptions.lock().unwrap().take() {
                        for s in subs {
                            s.unsubscribe();
                        }
                    }
                })),
                SubscriptionHandle::Nil,
            )
        })
    }

    /// Merges the current observable with another observable, emitting items
    /// from both concurrently.
    fn merge_with(self, source: Observable<T>) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        self.merge(vec![source])
    }

    /// Serializes delivery into the downstream observer.
    ///
    /// All three notification callbacks are routed through one mutual
    /// exclusion gate: at most one notification is being delivered downstream
    /// at any instant, and notifications are delivered in the order their
    /// producers acquired the gate. Nothing is reordered or dropped. Use this
    /// behind `merge` or a hot relay when producers run on independent
    /// workers.
    ///
    /// The gate serializes the downstream side only; notifications that
    /// already raced upstream arrive in whatever order they won that race.
    fn synchronize(mut self) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
    {
        Observable::new(move |o| {
            // The mutex is the gate: delivery happens while holding it.
            let gate = Arc::new(Mutex::new(o));
            let gate_e = Arc::clone(&gate);
            let gate_c = Arc::clone(&gate);

            let u = Subscriber::new(
                move |v| {
                    gate.lock().unwrap().next(v);
                },
                move |observable_error| {
                    gate_e.lock().unwrap().error(observable_error);
                },
                move || {
                    gate_c.lock().unwrap().complete();
                },
            );
            self.subscribe(u)
        })
    }

    /// Runs the act of subscribing on the given [`Scheduler`] instead of the
    /// caller's context.
    ///
    /// Since subscribing is what starts a cold observable's production loop,
    /// this is how a synchronous source is moved onto a worker: the caller's
    /// `subscribe` returns immediately with a handle to the scheduled worker,
    /// and the production happens there. Two sources subscribed on background
    /// schedulers emit concurrently, which is what makes `merge` plus
    /// `synchronize` meaningful.
    ///
    /// [`Scheduler`]: ../trait.Scheduler.html
    fn subscribe_on<W>(self, scheduler: W) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        W: Scheduler + Send + Sync + 'static,
    {
        let source = Arc::new(Mutex::new(self));
        Observable::new(move |o| {
            let source = Arc::clone(&source);
            let (tx, rx) = std::sync::mpsc::channel();

            let handle = scheduler.schedule(Box::new(move || {
                let subscription = source.lock().unwrap().subscribe(o);
                let _ = tx.send(subscription);
            }));

            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || {
                    // Wait for the worker to hand the inner subscription
                    // over, then release it.
                    if let Ok(s) = rx.recv() {
                        s.unsubscribe();
                    }
                })),
                handle,
            )
        })
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, v: Subscriber<Self::ObsType>) -> Subscription {
        (self.subscribe_fn)(v)
    }
}

impl<O, T: 'static> ObservableExt<T> for O where O: Subscribeable<ObsType = T> {}
