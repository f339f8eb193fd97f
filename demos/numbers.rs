//! The hand-rolled numbers source: an `Observable` built directly from a
//! subscribe function, emitting five integers to a console observer and
//! completing.
//!
//! To run this demo, execute `cargo run --example numbers`.

use rxe::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
use rxe::{Observable, Observer, Subscribeable};

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

/// Emits `0..amount` to every subscriber, then completes.
fn numbers_observable(amount: i32) -> Observable<i32> {
    Observable::new(move |mut observer: Subscriber<i32>| {
        for i in 0..amount {
            observer.next(i);
        }
        observer.complete();

        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::Nil)
    })
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut numbers = numbers_observable(5);
    numbers.subscribe(console_observer("numbers"));
}
