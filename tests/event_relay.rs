use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use rxe::subscribe::{Subscriber, Unsubscribeable};
use rxe::{EventRelay, ObservableExt, Subscribeable};

#[test]
fn subscription_is_not_retroactive() {
    let relay: EventRelay<i32> = EventRelay::new();

    // Raised with nobody attached: lost, by design.
    relay.raise(1);
    relay.raise(2);

    let seen: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_c = Arc::clone(&seen);

    let mut events = relay.to_observable();
    events.subscribe(Subscriber::on_next(move |v| {
        seen_c.lock().unwrap().push(v);
    }));

    relay.raise(3);

    assert_eq!(
        *seen.lock().unwrap(),
        vec![3],
        "a late subscriber must not see events raised before it attached"
    );
}

#[test]
fn each_subscription_gets_its_own_registration() {
    let relay: EventRelay<i32> = EventRelay::new();
    let mut events = relay.to_observable();

    let first: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let second: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));
    let first_c = Arc::clone(&first);
    let second_c = Arc::clone(&second);

    let first_subscription = events.subscribe(Subscriber::on_next(move |v| {
        first_c.lock().unwrap().push(v);
    }));
    events.subscribe(Subscriber::on_next(move |v| {
        second_c.lock().unwrap().push(v);
    }));
    assert_eq!(relay.len(), 2);

    relay.raise(1);

    // Unsubscribing detaches only that subscriber's handler.
    first_subscription.unsubscribe();
    relay.raise(2);

    assert_eq!(*first.lock().unwrap(), vec![1]);
    assert_eq!(*second.lock().unwrap(), vec![1, 2]);
    assert_eq!(relay.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_raisers_synchronize_into_single_stream() {
    let relay: EventRelay<(i32, f64)> = EventRelay::new();

    let entered = Arc::new(AtomicBool::new(false));
    let violations = Arc::new(Mutex::new(0));
    let delivered = Arc::new(Mutex::new(0));

    let entered_c = Arc::clone(&entered);
    let violations_c = Arc::clone(&violations);
    let delivered_c = Arc::clone(&delivered);

    let mut messages = relay.to_observable().synchronize();
    messages.subscribe(Subscriber::on_next(move |_: (i32, f64)| {
        if entered_c.swap(true, Ordering::SeqCst) {
            *violations_c.lock().unwrap() += 1;
        }
        std::thread::sleep(Duration::from_millis(1));
        *delivered_c.lock().unwrap() += 1;
        entered_c.store(false, Ordering::SeqCst);
    }));

    let started = Instant::now();
    let mut producers = Vec::with_capacity(2);
    for start in [0, 10] {
        let relay = relay.clone();
        producers.push(tokio::task::spawn(async move {
            for i in 0..10_i32 {
                tokio::time::sleep(Duration::from_millis((i % 4) as u64)).await;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                relay.raise((start + i, elapsed_ms));
            }
        }));
    }
    for producer in producers {
        producer.await.unwrap();
    }

    assert_eq!(
        *delivered.lock().unwrap(),
        20,
        "every raised event must be delivered exactly once"
    );
    assert_eq!(
        *violations.lock().unwrap(),
        0,
        "downstream observer was entered re-entrantly"
    );
}
