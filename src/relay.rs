//! A hot event relay: an explicit handler registry bridging callback-style
//! event sources into the observable world.
//!
//! Unlike an [`Observable`], which starts a fresh production per
//! subscription, a relay multicasts one ongoing stream of raised events to
//! whoever is registered at the moment of the raise. There is no replay:
//! subscribing is not retroactive, and a handler added late only sees events
//! raised after it was added.
//!
//! [`Observable`]: struct.Observable.html

use std::hash::Hasher;
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::errors::StreamError;
use crate::observer::Observer;
use crate::subscription::subscribe::{
    Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic,
};
use crate::Observable;

fn random_seed() -> u64 {
    std::hash::BuildHasher::build_hasher(&std::collections::hash_map::RandomState::new()).finish()
}

// Pseudorandom number generator from the "Xorshift RNGs" paper by George
// Marsaglia.
//
// https://github.com/rust-lang/rust/blob/1.55.0/library/core/src/slice/sort.rs#L559-L573
fn gen_key() -> impl Iterator<Item = u64> {
    let mut random: u64 = random_seed();
    std::iter::repeat_with(move || {
        random ^= random << 13;
        random ^= random >> 17;
        random ^= random << 5;
        random
    })
}

type Handler<T> = Box<dyn FnMut(T) + Send>;

struct Registry<T> {
    handlers: Vec<(u64, Handler<T>)>,
    closed: bool,
}

/// A hot source backed by an add-handler/remove-handler registry.
///
/// `raise` forwards the payload to every handler registered at that moment,
/// in registration order, under the registry lock; concurrent raisers
/// therefore serialize at the relay. Cloning an `EventRelay` clones only the
/// pointer to the shared registry, so producers and subscribers can hold
/// their own handles.
///
/// The classic `(sender, payload)` event-handler signature maps onto the
/// payload type; use a tuple payload when the sender matters.
///
/// # Example
///
/// ```no_run
/// use rxe::subscribe::Subscriber;
/// use rxe::{EventRelay, Subscribeable};
///
/// let relay: EventRelay<i32> = EventRelay::new();
///
/// relay.raise(1); // Nobody registered, nobody sees this.
///
/// let mut events = relay.to_observable();
/// events.subscribe(Subscriber::on_next(|v| println!("got {}", v)));
///
/// relay.raise(2); // Printed by the subscriber above.
/// ```
pub struct EventRelay<T>(Arc<Mutex<Registry<T>>>);

impl<T> Clone for EventRelay<T> {
    fn clone(&self) -> Self {
        EventRelay(Arc::clone(&self.0))
    }
}

impl<T> Default for EventRelay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventRelay<T> {
    /// Creates a relay with an empty handler registry.
    pub fn new() -> Self {
        EventRelay(Arc::new(Mutex::new(Registry {
            handlers: Vec::with_capacity(16),
            closed: false,
        })))
    }

    /// Registers `handler` and returns the key that removes it.
    ///
    /// Handlers registered on a closed relay are silently discarded; the
    /// returned key is then a no-op to remove.
    pub fn add_handler(&self, handler: impl FnMut(T) + Send + 'static) -> u64 {
        let key: u64 = gen_key().next().unwrap_or_else(random_seed);

        let mut registry = self.0.lock().unwrap();
        if !registry.closed {
            registry.handlers.push((key, Box::new(handler)));
            trace!(key, "event relay handler registered");
        }
        key
    }

    /// Removes the handler registered under `key`. Unknown keys are ignored.
    pub fn remove_handler(&self, key: u64) {
        self.0
            .lock()
            .unwrap()
            .handlers
            .retain(move |(k, _)| *k != key);
        trace!(key, "event relay handler removed");
    }

    /// Closes the relay: every handler is dropped, subsequent raises are
    /// ignored and subsequent subscriptions observe an immediate error.
    pub fn close(&self) {
        let mut registry = self.0.lock().unwrap();
        registry.closed = true;
        registry.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn len(&self) -> usize {
        self.0.lock().unwrap().handlers.len()
    }

    /// Returns `true` if no handlers are registered, `false` otherwise.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + 'static> EventRelay<T> {
    /// Multicasts `payload` to every registered handler, in registration
    /// order. Raising on a closed relay does nothing.
    pub fn raise(&self, payload: T) {
        let mut registry = self.0.lock().unwrap();
        if registry.closed {
            return;
        }
        for (_, handler) in &mut registry.handlers {
            handler(payload.clone());
        }
    }

    /// Wraps the relay's add/remove pair as a hot `Observable`.
    ///
    /// Each subscription registers one forwarding handler of its own;
    /// unsubscribing removes only that handler and leaves every other
    /// subscriber attached. Past events are not replayed. Subscribing after
    /// [`close`] signals [`StreamError::RelayClosed`] to the subscriber.
    ///
    /// [`close`]: struct.EventRelay.html#method.close
    /// [`StreamError::RelayClosed`]: enum.StreamError.html#variant.RelayClosed
    pub fn to_observable(&self) -> Observable<T> {
        let relay = self.clone();

        Observable::new(move |mut subscriber: Subscriber<T>| {
            if relay.0.lock().unwrap().closed {
                subscriber.error(Arc::new(StreamError::RelayClosed));
                return Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil);
            }

            let key = relay.add_handler(move |v| subscriber.next(v));

            let relay_detach = relay.clone();
            Subscription::new(
                UnsubscribeLogic::Logic(Box::new(move || relay_detach.remove_handler(key))),
                SubscriptionHandle::Nil,
            )
        })
    }
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use super::EventRelay;
    use crate::subscribe::{Subscriber, Unsubscribeable};
    use crate::Subscribeable;

    fn value_register() -> (Arc<Mutex<Vec<i32>>>, impl FnMut(i32) + Send + 'static) {
        let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::with_capacity(8)));
        let seen_c = Arc::clone(&seen);
        (seen, move |v| seen_c.lock().unwrap().push(v))
    }

    #[test]
    fn relay_multicasts_to_registered_handlers() {
        let relay: EventRelay<i32> = EventRelay::new();

        let (first, first_fn) = value_register();
        let (second, second_fn) = value_register();

        relay.add_handler(first_fn);
        relay.add_handler(second_fn);
        assert_eq!(relay.len(), 2);

        relay.raise(1);
        relay.raise(2);

        assert_eq!(*first.lock().unwrap(), vec![1, 2]);
        assert_eq!(*second.lock().unwrap(), vec![1, 2]);
    }

    #[test]
    fn late_handler_gets_no_replay() {
        let relay: EventRelay<i32> = EventRelay::new();

        let (early, early_fn) = value_register();
        relay.add_handler(early_fn);

        relay.raise(1);
        relay.raise(2);

        let (late, late_fn) = value_register();
        relay.add_handler(late_fn);

        relay.raise(3);

        assert_eq!(*early.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(
            *late.lock().unwrap(),
            vec![3],
            "late handler must not see events raised before registration"
        );
    }

    #[test]
    fn remove_handler_detaches_only_that_handler() {
        let relay: EventRelay<i32> = EventRelay::new();

        let (kept, kept_fn) = value_register();
        let (removed, removed_fn) = value_register();

        relay.add_handler(kept_fn);
        let key = relay.add_handler(removed_fn);

        relay.raise(1);
        relay.remove_handler(key);
        relay.raise(2);

        assert_eq!(*kept.lock().unwrap(), vec![1, 2]);
        assert_eq!(*removed.lock().unwrap(), vec![1]);
        assert_eq!(relay.len(), 1);
    }

    #[test]
    fn closed_relay_drops_handlers_and_ignores_raises() {
        let relay: EventRelay<i32> = EventRelay::new();

        let (seen, seen_fn) = value_register();
        relay.add_handler(seen_fn);

        relay.raise(1);
        relay.close();
        relay.raise(2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
        assert!(relay.is_empty());

        // Handlers registered after close are discarded.
        let (after, after_fn) = value_register();
        relay.add_handler(after_fn);
        relay.raise(3);
        assert!(after.lock().unwrap().is_empty());
    }

    #[test]
    fn subscription_forwards_raised_events() {
        let relay: EventRelay<i32> = EventRelay::new();
        let (seen, seen_fn) = value_register();

        relay.raise(0); // Hot: raised before subscribing, never seen.

        let mut events = relay.to_observable();
        let subscription = events.subscribe(Subscriber::on_next(seen_fn));

        relay.raise(1);
        relay.raise(2);

        subscription.unsubscribe();
        relay.raise(3);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert!(relay.is_empty());
    }

    #[test]
    fn subscription_after_close_errors() {
        let relay: EventRelay<i32> = EventRelay::new();
        relay.close();

        let errored = Arc::new(Mutex::new(false));
        let errored_c = Arc::clone(&errored);

        let mut events = relay.to_observable();
        events.subscribe(Subscriber::new(
            |_| panic!("closed relay must not emit"),
            move |_| *errored_c.lock().unwrap() = true,
            || panic!("closed relay must not complete"),
        ));

        assert!(*errored.lock().unwrap());
    }
}
