//! Multiple producers signalling the same callback.

use pulse::progress::listener_fn;
use pulse::{ManualClock, ProgressCallback, ThrottlingProgressCallback};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_signals_at_one_instant_forward_once() {
    let clock = ManualClock::shared(1_000);
    let callback = Arc::new(ThrottlingProgressCallback::with_clock(50, clock.clone()));
    let deliveries = Arc::new(AtomicUsize::new(0));
    let counter = deliveries.clone();
    callback.add_progress_listener(listener_fn(move |_: &usize| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let callback = callback.clone();
            thread::spawn(move || {
                for i in 0..1_000 {
                    callback.progress_made(worker * 1_000 + i);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(deliveries.load(Ordering::SeqCst), 1);
}

#[test]
fn test_concurrent_signals_respect_window_as_time_moves() {
    let clock = ManualClock::shared(0);
    let callback = Arc::new(ThrottlingProgressCallback::with_clock(10, clock.clone()));
    let deliveries = Arc::new(AtomicUsize::new(0));
    let counter = deliveries.clone();
    callback.add_progress_listener(listener_fn(move |_: &u64| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));

    // Time advances in 11ms steps between rounds, so each round forwards exactly once.
    for round in 0..20u64 {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let callback = callback.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        callback.progress_made(round);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        clock.advance(11);
    }

    assert_eq!(deliveries.load(Ordering::SeqCst), 20);
}
