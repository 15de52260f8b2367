//! Property-based tests for the forwarding rule

use parking_lot::Mutex;
use proptest::prelude::*;
use pulse::progress::listener_fn;
use pulse::{ManualClock, ProgressCallback, ThrottlingProgressCallback};
use std::sync::Arc;

/// Replay `times` through a callback and return the indices that were forwarded.
fn forwarded_indices(frequency_ms: u64, times: &[u64]) -> Vec<usize> {
    let clock = ManualClock::shared(0);
    let callback = ThrottlingProgressCallback::with_clock(frequency_ms, clock.clone());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    callback.add_progress_listener(listener_fn(move |index: &usize| {
        sink.lock().push(*index);
        Ok(())
    }));

    for (index, t) in times.iter().enumerate() {
        clock.set(*t);
        callback.progress_made(index);
    }

    let result = seen.lock().clone();
    result
}

/// Test that forwarding matches the rule: first call, or strictly more than
/// `frequency_ms` after the last forwarded call
#[test]
fn test_forwarding_matches_rule_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(0u64..200, prop::collection::vec(0u64..2_000, 1..64)),
            |(frequency_ms, times)| {
                let forwarded = forwarded_indices(frequency_ms, &times);

                let mut expected = Vec::new();
                let mut last: Option<u64> = None;
                for (index, t) in times.iter().enumerate() {
                    let fire = match last {
                        None => true,
                        Some(last) => t.saturating_sub(last) > frequency_ms,
                    };
                    if fire {
                        last = Some(*t);
                        expected.push(index);
                    }
                }

                prop_assert_eq!(forwarded, expected);
                Ok(())
            },
        )
        .unwrap();
}

/// Test that forwarded signals on a non-decreasing clock are spaced by more
/// than the window, and the first signal always fires
#[test]
fn test_forwarded_spacing_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(0u64..100, prop::collection::vec(0u64..50, 1..128)),
            |(frequency_ms, gaps)| {
                let times: Vec<u64> = gaps
                    .iter()
                    .scan(0u64, |acc, gap| {
                        *acc += gap;
                        Some(*acc)
                    })
                    .collect();
                let forwarded = forwarded_indices(frequency_ms, &times);

                prop_assert_eq!(forwarded.first().copied(), Some(0));
                for pair in forwarded.windows(2) {
                    prop_assert!(times[pair[1]] - times[pair[0]] > frequency_ms);
                }
                Ok(())
            },
        )
        .unwrap();
}
