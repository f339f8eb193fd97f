//! Generator-driven sequences: `Observable::generate` produces a lazy
//! sequence from a seed, a continuation condition, a step and a projection,
//! and a fallible iterator source shows a sequence failing partway through.
//!
//! To run this demo, execute `cargo run --example generate`.

use std::{error::Error, sync::Arc};

use rxe::subscribe::Subscriber;
use rxe::{Observable, StreamError, Subscribeable};

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

    // Each iteration projects the state before stepping: 0 2 4 ... 18.
    let mut doubled = Observable::generate(0, |i| Ok(*i < 10), |i| i + 1, |i| Ok(i * 2));
    doubled.subscribe(console_observer("generate"));

    // A sequence that fails after three values; the failure arrives as the
    // single error notification and nothing follows it.
    let mut throws = Observable::from_fallible_iter(vec![
        Ok(1),
        Ok(2),
        Ok(3),
        Err(Arc::new(StreamError::Generator("something bad happened".into()))
            as Arc<dyn Error + Send + Sync>),
    ]);
    throws.subscribe(console_observer("throws"));
}
