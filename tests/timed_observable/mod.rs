#![allow(dead_code)]

use std::{
    error::Error,
    sync::{Arc, Mutex},
    time::Duration,
};

use rxe::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
use rxe::{Observable, Observer};

/// An asynchronous observable emitting `start..start + count` from its own
/// OS thread, pausing `step_ms` between emissions.
///
/// The value the producer loop ended on is written into `final_emit` when
/// the thread winds down, so tests can verify whether an unsubscribe cut the
/// production short. Unsubscribing sends the stop signal through a channel
/// the producer checks before every emission.
pub fn timed_range_observable(
    start: u32,
    count: u32,
    step_ms: u64,
    final_emit: &Arc<Mutex<Option<u32>>>,
) -> Observable<u32> {
    let final_emit = Arc::clone(final_emit);

    Observable::new(move |mut o: Subscriber<_>| {
        let done = Arc::new(Mutex::new(false));
        let done_c = Arc::clone(&done);
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            if let Ok(stop) = rx.recv() {
                *done_c.lock().unwrap() = stop;
            }
        });

        let final_emit = Arc::clone(&final_emit);
        let jh = std::thread::spawn(move || {
            let mut last = None;

            for i in start..start + count {
                if *done.lock().unwrap() {
                    break;
                }
                last = Some(i);
                o.next(i);
                std::thread::sleep(Duration::from_millis(step_ms));
            }
            // Record the last emit before completing, so observers that saw
            // the completion can rely on the record being in place.
            *final_emit.lock().unwrap() = last;
            o.complete();
        });

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                if tx.send(true).is_err() {
                    eprintln!("receiver dropped");
                }
            })),
            SubscriptionHandle::JoinThread(jh),
        )
    })
}

/// Tokio-task flavor of [`timed_range_observable`], using an async sleep
/// between emissions and a future-based unsubscribe signal.
pub fn timed_range_observable_tokio(
    start: u32,
    count: u32,
    step_ms: u64,
    final_emit: &Arc<Mutex<Option<u32>>>,
) -> Observable<u32> {
    let final_emit = Arc::clone(final_emit);

    Observable::new(move |mut o: Subscriber<_>| {
        let done = Arc::new(Mutex::new(false));
        let done_c = Arc::clone(&done);
        let (tx, mut rx) = tokio::sync::mpsc::channel(10);

        tokio::task::spawn(async move {
            if let Some(stop) = rx.recv().await {
                *done_c.lock().unwrap() = stop;
            }
        });

        let final_emit = Arc::clone(&final_emit);
        let jh = tokio::task::spawn(async move {
            let mut last = None;

            for i in start..start + count {
                if *done.lock().unwrap() {
                    break;
                }
                last = Some(i);
                o.next(i);
                tokio::time::sleep(Duration::from_millis(step_ms)).await;
            }
            *final_emit.lock().unwrap() = last;
            o.complete();
        });

        Subscription::new(
            UnsubscribeLogic::Future(Box::pin(async move {
                if tx.send(true).await.is_err() {
                    eprintln!("receiver dropped");
                }
            })),
            SubscriptionHandle::JoinTask(jh),
        )
    })
}

/// An asynchronous observable emitting `0..count` from its own OS thread and
/// then failing with `error` instead of completing.
pub fn failing_range_observable(
    count: u32,
    step_ms: u64,
    error: Arc<dyn Error + Send + Sync>,
) -> Observable<u32> {
    Observable::new(move |mut o: Subscriber<_>| {
        let error = Arc::clone(&error);

        let jh = std::thread::spawn(move || {
            for i in 0..count {
                o.next(i);
                std::thread::sleep(Duration::from_millis(step_ms));
            }
            o.error(error);
        });

        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::JoinThread(jh))
    })
}

/// Polls `cond` every 10 ms until it holds or `timeout_ms` elapses.
/// Returns whether the condition was observed.
pub fn wait_until(timeout_ms: u64, mut cond: impl FnMut() -> bool) -> bool {
    let rounds = timeout_ms / 10 + 1;
    for _ in 0..rounds {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}
