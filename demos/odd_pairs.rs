//! The filter/pair/skip/map pipeline: odds from a range, each summed with
//! the previous odd value.
//!
//! `pair_with_previous` emits a synthetic `(None, first)` pair before the
//! real ones; chaining `skip(1)` to discard it is the caller's job.
//!
//! To run this demo, execute `cargo run --example odd_pairs`.

use rxe::subscribe::Subscriber;
use rxe::{Observable, ObservableExt, Subscribeable};

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

fn main() {
    tracing_subscriber::fmt::init();

    let mut sums = Observable::range(0, 10)
        .filter(|x| x % 2 > 0)
        .pair_with_previous()
        .skip(1)
        .map(|(previous, current)| previous.map_or(current, |p| p + current));

    sums.subscribe(console_observer("odds"));
}
