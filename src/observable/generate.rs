//! Finite, loop-driven sources: a generic generator plus the range and
//! iterator conveniences built on top of it.

use std::{
    error::Error,
    sync::{Arc, Mutex},
};

use crate::observer::Observer;
use crate::subscription::subscribe::{
    Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
};

use super::Observable;

/// One step of a generator loop: another value, the end of the sequence, or
/// a failure that terminates it.
///
/// Fallible generator closures report failure through `Result` rather than
/// unwinding; the generator loop folds their outcomes into this variant and
/// turns `Failed` into a single `error` notification.
pub enum GenerateStep<T> {
    Value(T),
    Done,
    Failed(Arc<dyn Error + Send + Sync>),
}

impl<T: 'static> Observable<T> {
    /// Creates an observable from a generator: a state seed, a continuation
    /// condition, a state iterator and a projection from state to emitted
    /// value.
    ///
    /// The loop evaluates `condition(&state)`. On `Ok(false)` it signals
    /// completion and stops. On `Ok(true)` it emits `project(&state)` as the
    /// next value and advances the state with `iterate`. The first `Err`
    /// returned by `condition` or `project` is delivered as the single
    /// `error` notification and ends the sequence; nothing follows it.
    ///
    /// The produced observable is synchronous and cold: every subscription
    /// replays the generator from the seed on the subscribing context. Chain
    /// [`subscribe_on`] to run the loop on a worker instead.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rxe::{Observable, Subscribeable};
    /// use rxe::subscribe::Subscriber;
    ///
    /// // 0, 2, 4, ..., 18
    /// let mut doubled = Observable::generate(
    ///     0,
    ///     |i| Ok(*i < 10),
    ///     |i| i + 1,
    ///     |i| Ok(i * 2),
    /// );
    ///
    /// doubled.subscribe(Subscriber::on_next(|v| println!("{}", v)));
    /// ```
    ///
    /// [`subscribe_on`]: trait.ObservableExt.html#method.subscribe_on
    pub fn generate<S, C, I, P>(
        initial_state: S,
        condition: C,
        iterate: I,
        project: P,
    ) -> Observable<T>
    where
        S: Clone + Send + Sync + 'static,
        C: FnMut(&S) -> Result<bool, Arc<dyn Error + Send + Sync>> + Send + Sync + 'static,
        I: FnMut(S) -> S + Send + Sync + 'static,
        P: FnMut(&S) -> Result<T, Arc<dyn Error + Send + Sync>> + Send + Sync + 'static,
    {
        let condition = Arc::new(Mutex::new(condition));
        let iterate = Arc::new(Mutex::new(iterate));
        let project = Arc::new(Mutex::new(project));

        Observable::new(move |mut o: Subscriber<T>| {
            let mut state = initial_state.clone();

            loop {
                let step = match condition.lock().unwrap()(&state) {
                    Ok(false) => GenerateStep::Done,
                    Ok(true) => match project.lock().unwrap()(&state) {
                        Ok(v) => GenerateStep::Value(v),
                        Err(e) => GenerateStep::Failed(e),
                    },
                    Err(e) => GenerateStep::Failed(e),
                };

                match step {
                    GenerateStep::Value(v) => {
                        o.next(v);
                        let advanced = iterate.lock().unwrap()(state);
                        state = advanced;
                    }
                    GenerateStep::Done => {
                        o.complete();
                        break;
                    }
                    GenerateStep::Failed(e) => {
                        o.error(e);
                        break;
                    }
                }
            }

            Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
        })
    }

    /// Creates an observable that emits every item of the iterator, then
    /// completes.
    pub fn from_iter<I>(iter: I) -> Observable<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Clone + Send + Sync + 'static,
    {
        let iter = iter.into_iter();

        Observable::new(move |mut o: Subscriber<T>| {
            for v in iter.clone() {
                o.next(v);
            }
            o.complete();

            Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
        })
    }

    /// Creates an observable from an iterator of results.
    ///
    /// `Ok` items are emitted in order; the first `Err` becomes the `error`
    /// notification and ends the sequence, like an iterator that fails
    /// partway through.
    pub fn from_fallible_iter<I>(iter: I) -> Observable<T>
    where
        I: IntoIterator<Item = Result<T, Arc<dyn Error + Send + Sync>>>,
        I::IntoIter: Clone + Send + Sync + 'static,
    {
        let iter = iter.into_iter();

        Observable::new(move |mut o: Subscriber<T>| {
            for item in iter.clone() {
                match item {
                    Ok(v) => o.next(v),
                    Err(e) => {
                        o.error(e);
                        return Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil);
                    }
                }
            }
            o.complete();

            Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
        })
    }
}

impl Observable<i32> {
    /// A synchronous observable emitting the integers
    /// `start..start + count` in order, then completing.
    pub fn range(start: i32, count: i32) -> Observable<i32> {
        Observable::generate(start, move |i| Ok(*i < start + count), |i| i + 1, |i| Ok(*i))
    }
}
