//! Ledger Concurrency Tests
//!
//! Many threads record into one ledger, with and without a live subscriber.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use mimic_core::{Ledger, Mock, StubRegistry};

const THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 250;

#[test]
fn test_ids_have_no_gaps_under_contention() {
    let ledger = Ledger::new("CounterMock");
    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                for step in 0..CALLS_PER_THREAD {
                    ledger.record::<_, ()>("increment(by:)", (worker, step));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let calls = ledger.calls();
    assert_eq!(calls.len(), THREADS * CALLS_PER_THREAD);
    for (index, call) in calls.iter().enumerate() {
        assert_eq!(call.id(), index as u64 + 1);
    }
    for pair in calls.windows(2) {
        assert!(pair[0].time() < pair[1].time());
    }

    let inputs: HashSet<_> = ledger
        .calls_matching_typed::<(usize, usize), ()>("increment(by:)")
        .iter()
        .map(|call| *call.input())
        .collect();
    assert_eq!(inputs.len(), THREADS * CALLS_PER_THREAD);
}

#[test]
fn test_subscriber_sees_every_call_exactly_once() {
    let ledger = Ledger::new("CounterMock");
    for n in 0..10_usize {
        ledger.record::<_, ()>("increment(by:)", (usize::MAX, n));
    }

    let writers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let ledger = ledger.clone();
            thread::spawn(move || {
                for step in 0..CALLS_PER_THREAD {
                    ledger.record::<_, ()>("increment(by:)", (worker, step));
                }
            })
        })
        .collect();
    let mut stream = ledger.subscribe("increment");
    for handle in writers {
        handle.join().unwrap();
    }

    let delivered = stream.drain();
    let ids: Vec<u64> = delivered.iter().map(|call| call.id()).collect();
    let expected: Vec<u64> = (1..=(10 + THREADS * CALLS_PER_THREAD) as u64).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_cancelling_while_recording() {
    let ledger = Ledger::new("CounterMock");
    let writer = {
        let ledger = ledger.clone();
        thread::spawn(move || {
            for step in 0..CALLS_PER_THREAD {
                ledger.record::<_, ()>("tick()", step);
            }
        })
    };

    for _ in 0..20 {
        let mut stream = ledger.subscribe("tick()");
        let _ = stream.try_next();
        stream.cancel();
    }
    writer.join().unwrap();

    assert_eq!(ledger.subscription_count(), 0);
    assert_eq!(ledger.call_count(), CALLS_PER_THREAD);
}

#[test]
fn test_closures_can_call_other_mocks() {
    let clock = Mock::new("ClockMock");
    clock.stub_output::<(), u64>("now()", 100);

    let stubs = Arc::new(StubRegistry::new("SchedulerMock"));
    let inner = clock.clone();
    stubs.register_dynamic::<u64, u64, _>("deadline(after:)", move |delay| {
        inner.invoke::<(), u64>("now()", ()) + delay
    });

    let handles: Vec<_> = (0..THREADS as u64)
        .map(|delay| {
            let stubs = Arc::clone(&stubs);
            thread::spawn(move || stubs.resolve::<u64, u64>("deadline(after:)", delay))
        })
        .collect();
    let mut results: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort_unstable();

    assert_eq!(results, (100..100 + THREADS as u64).collect::<Vec<_>>());
    assert_eq!(clock.ledger().call_count_matching("now()"), THREADS);
}
