//! Two producers scheduled onto worker threads, merged into one stream and
//! synchronized so the console observer is never entered concurrently.
//!
//! The sources themselves are plain synchronous loops; `subscribe_on` is
//! what moves each production onto its own worker, and `merge` interleaves
//! whatever arrives first.
//!
//! To run this demo, execute `cargo run --example merge_threads`.

use std::time::Duration;

use rxe::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
use rxe::{Observable, ObservableExt, Observer, Subscribeable, ThreadScheduler};

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

/// A synchronous range producer that paces itself between emissions.
fn paced_range(start: i32, count: i32, step: Duration) -> Observable<i32> {
    Observable::new(move |mut observer: Subscriber<i32>| {
        for i in start..start + count {
            observer.next(i);
            std::thread::sleep(step);
        }
        observer.complete();

        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
    })
}

fn main() {
    tracing_subscriber::fmt::init();

    let first = paced_range(0, 10, Duration::from_millis(3)).subscribe_on(ThreadScheduler);
    let second = paced_range(10, 10, Duration::from_millis(5)).subscribe_on(ThreadScheduler);

    let mut merged = first.merge_with(second).synchronize();
    merged.subscribe(console_observer("multi"));

    // The producers run on their own workers; give them room to finish.
    std::thread::sleep(Duration::from_millis(200));
}
