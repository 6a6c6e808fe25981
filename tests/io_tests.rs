#![cfg(feature = "effect")]
//! Unit tests for the IO graph and its trampolined interpreter.
//!
//! Tests cover:
//! - Construction and laziness
//! - Re-running a graph
//! - Stack safety for deep chains (run and drop)
//! - Bounded runs of `forever`
//! - Panic capture at the edge

use rstest::{fixture, rstest};
use stackless::effect::{EffectError, IO, RunOptions};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[fixture]
fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn counting(counter: &Arc<AtomicUsize>) -> IO<usize> {
    let counter = Arc::clone(counter);
    IO::from_thunk(move || counter.fetch_add(1, Ordering::SeqCst) + 1)
}

// =============================================================================
// Construction and Laziness
// =============================================================================

#[rstest]
fn test_io_from_thunk_is_deferred(counter: Arc<AtomicUsize>) {
    let io = counting(&counter).map(|n| n * 10);
    assert_eq!(counter.load(Ordering::SeqCst), 0);

    assert_eq!(io.run(), 10);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_io_continuations_are_not_invoked_during_construction() {
    let io = IO::of(1).flat_map(|_| -> IO<i32> { panic!("continuation ran too early") });
    drop(io);
}

#[derive(Debug, PartialEq)]
struct Ticket {
    number: usize,
}

#[rstest]
fn test_io_map_accepts_results_that_are_not_clone(counter: Arc<AtomicUsize>) {
    let io = counting(&counter).map(|number| Ticket { number });

    assert_eq!(io.run(), Ticket { number: 1 });
    assert_eq!(io.run(), Ticket { number: 2 });
}

#[rstest]
fn test_io_map_can_produce_boxed_errors() {
    let io = IO::of("not a number").map(|text| {
        text.parse::<u8>()
            .map_err(|error| Box::new(error) as Box<dyn std::error::Error + Send>)
    });

    assert!(io.run().is_err());
    assert!(io.run().is_err());
}

#[rstest]
fn test_io_forever_construction_is_lazy(counter: Arc<AtomicUsize>) {
    let _forever = counting(&counter).forever();
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Re-running
// =============================================================================

#[rstest]
fn test_io_rerun_repeats_side_effects(counter: Arc<AtomicUsize>) {
    let io = counting(&counter);

    assert_eq!(io.run(), 1);
    assert_eq!(io.run(), 2);
    assert_eq!(io.clone().run(), 3);
}

#[rstest]
fn test_io_effects_run_in_chain_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let record = |label: &'static str| {
        let log = Arc::clone(&log);
        IO::from_thunk(move || log.lock().unwrap().push(label))
    };

    let io = record("first")
        .then(record("second"))
        .flat_map({
            let third = record("third");
            move |()| third.clone()
        });
    io.run();

    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}

#[rstest]
fn test_io_can_run_concurrently_from_threads(counter: Arc<AtomicUsize>) {
    let io = (0..100).fold(counting(&counter), |io, _| io.map(|n| n + 1));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let io = io.clone();
            std::thread::spawn(move || io.run())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap() > 100);
    }
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

// =============================================================================
// Stack Safety
// =============================================================================

#[rstest]
fn test_io_million_flat_maps_do_not_overflow() {
    let mut io = IO::of(0_u64);
    for _ in 0..1_000_000 {
        io = io.flat_map(|x| IO::of(x + 1));
    }
    assert_eq!(io.run(), 1_000_000);
}

#[rstest]
fn test_io_non_tail_recursion_is_stack_safe() {
    fn sum_to(n: u64) -> IO<u64> {
        if n == 0 {
            IO::of(0)
        } else {
            IO::of(n).flat_map(move |x| sum_to(n - 1).map(move |rest| rest + x))
        }
    }

    assert_eq!(sum_to(200_000).run(), 200_000 * 200_001 / 2);
}

#[rstest]
fn test_io_deep_chain_can_be_dropped_after_running() {
    let io = (0..500_000).fold(IO::of(0_u32), |io, _| io.map(|x| x.wrapping_add(1)));
    assert_eq!(io.run(), 500_000);
    drop(io);
}

#[rstest]
fn test_io_right_nested_chain_runs_and_drops() {
    let io = (0..200_000).fold(IO::of(0_u32), |rest, n| IO::of(n).then(rest));
    assert_eq!(io.run(), 0);
    drop(io);
}

#[rstest]
fn test_io_right_nested_chain_drops_without_running() {
    let io = (0..200_000).fold(IO::of(0_u32), |rest, n| {
        IO::of(n).flat_map(move |_| rest.clone())
    });
    drop(io);
}

#[rstest]
fn test_io_thunk_captured_chain_drops() {
    let io = (0..200_000).fold(IO::of(0_u32), |inner, _| {
        IO::from_thunk(move || inner.run() + 1)
    });
    drop(io);
}

// =============================================================================
// Bounded Runs
// =============================================================================

#[rstest]
#[case(10)]
#[case(1_000)]
#[case(100_000)]
fn test_io_forever_keeps_a_flat_stack(counter: Arc<AtomicUsize>, #[case] limit: u64) {
    let looping = counting(&counter).forever();

    let error = looping
        .run_with(&RunOptions::default().with_step_limit(limit))
        .unwrap_err();

    let EffectError::StepLimitExceeded { limit: reported, stats } = error else {
        panic!("expected a step limit error, got {error:?}");
    };
    assert_eq!(reported, limit);
    assert_eq!(stats.steps, limit);
    assert!(stats.peak_stack_depth <= 1, "{stats:?}");
    // Each iteration visits one Bind and one Leaf.
    assert_eq!(counter.load(Ordering::SeqCst) as u64, limit / 2);
}

#[rstest]
fn test_io_forever_of_a_chain_does_not_accumulate() {
    let body = IO::of(1).map(|x| x + 1).flat_map(|x| IO::of(x * 2));
    let looping = body.forever();

    let short = looping
        .run_with(&RunOptions::default().with_step_limit(1_000))
        .unwrap_err();
    let long = looping
        .run_with(&RunOptions::default().with_step_limit(100_000))
        .unwrap_err();

    let (
        EffectError::StepLimitExceeded { stats: short, .. },
        EffectError::StepLimitExceeded { stats: long, .. },
    ) = (short, long)
    else {
        panic!("forever can only stop at the step limit");
    };
    assert_eq!(short.peak_stack_depth, long.peak_stack_depth);
}

#[rstest]
fn test_io_run_with_finishes_within_limit() {
    let io = IO::of(2).map(|x| x * 21);
    let completed = io
        .run_with(&RunOptions::default().with_step_limit(3))
        .unwrap();
    assert_eq!(completed.value, 42);
    assert_eq!(completed.stats.steps, 3);
}

#[rstest]
fn test_io_run_with_honours_stack_capacity() {
    let io = (0..100).fold(IO::of(0), |io, _| io.map(|x| x + 1));
    let completed = io
        .run_with(&RunOptions::default().with_stack_capacity(128))
        .unwrap();
    assert_eq!(completed.value, 100);
    assert_eq!(completed.stats.peak_stack_depth, 100);
}

// =============================================================================
// Panic Capture
// =============================================================================

#[rstest]
#[should_panic(expected = "producer failed")]
fn test_io_run_propagates_panics() {
    IO::from_thunk(|| -> i32 { panic!("producer failed") }).run();
}

#[rstest]
fn test_io_try_run_captures_panics_in_continuations(counter: Arc<AtomicUsize>) {
    let io = counting(&counter).flat_map(|n| -> IO<usize> { panic!("continuation failed after {n}") });

    assert_eq!(
        io.try_run(),
        Err(EffectError::Panicked {
            message: "continuation failed after 1".to_string()
        })
    );
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[rstest]
fn test_io_try_run_returns_value_when_nothing_panics() {
    assert_eq!(IO::of("fine").try_run(), Ok("fine"));
}

#[rstest]
fn test_io_try_run_emits_a_warning() {
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("stackless=trace")
            .finish(),
    );

    let failing = IO::from_thunk(|| -> u8 { panic!("logged") });
    assert!(failing.try_run().is_err());
}
