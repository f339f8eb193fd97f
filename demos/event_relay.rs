//! An event relay as a hot observable: two asynchronous producers raise
//! `(value, elapsed millis)` events into the relay while a synchronized
//! subscriber prints them one at a time.
//!
//! Subscribing to a relay is not retroactive; only events raised after the
//! print subscription attaches show up on the console.
//!
//! To run this demo, execute `cargo run --example event_relay`.

use std::time::{Duration, Instant};

use rxe::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
use rxe::{EventRelay, Observable, ObservableExt, Observer, Subscribeable};
use tokio::{task, time};

fn console_observer<T: std::fmt::Debug + Send + 'static>(name: &'static str) -> Subscriber<T> {
    Subscriber::new(
        move |v: T| {
            println!(
                "[{:?}] {} - next({:?})",
                std::thread::current().id(),
                name,
                v
            );
        },
        move |e| {
            eprintln!(
                "[{:?}] {} - error: {}",
                std::thread::current().id(),
                name,
                e
            );
        },
        move || println!("[{:?}] {} - completed", std::thread::current().id(), name),
    )
}

/// Emits `start..start + count` from a Tokio task, waiting a little longer
/// before each value.
fn delayed_range(start: i32, count: i32) -> Observable<i32> {
    Observable::new(move |mut observer: Subscriber<i32>| {
        let join_handle = task::spawn(async move {
            for i in 0..count {
                time::sleep(Duration::from_millis(i as u64)).await;
                observer.next(start + i);
            }
            observer.complete();
        });

        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::JoinTask(join_handle))
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let relay: EventRelay<(i32, f64)> = EventRelay::new();
    let stopwatch = Instant::now();

    // Producers raise into the relay from whichever worker runs them.
    for start in [0, 10] {
        let relay = relay.clone();
        delayed_range(start, 10).subscribe(Subscriber::on_next(move |i| {
            relay.raise((i, stopwatch.elapsed().as_secs_f64() * 1000.0));
        }));
    }

    let mut messages = relay.to_observable().synchronize();
    messages.subscribe(console_observer("sync"));

    time::sleep(Duration::from_millis(100)).await;
}
