//! IO - Deferred, stack-safe synchronous computations.
//!
//! The `IO` type describes a computation as a graph of deferred steps.
//! Building the graph performs no side effects; they happen only when the
//! graph is interpreted by [`IO::run`] (or one of its checked variants).
//!
//! # Design Philosophy
//!
//! IO "describes" side effects but doesn't "execute" them. Every combinator
//! compiles down to one of two node shapes, `Leaf` and `Bind`, and the
//! trampolined interpreter evaluates them with an explicit heap stack. A chain
//! of a million `flat_map` calls therefore runs in constant native stack
//! space, and [`IO::forever`] can loop without ever growing that stack.
//!
//! A graph is immutable and reusable: running it twice performs its side
//! effects twice, with no memoization in between.
//!
//! # Examples
//!
//! ```rust
//! use stackless::effect::IO;
//!
//! let io = IO::of(10)
//!     .map(|x| x * 2)
//!     .flat_map(|x| IO::of(x + 1));
//! assert_eq!(io.run(), 21);
//! ```
//!
//! # Side Effect Deferral
//!
//! ```rust
//! use stackless::effect::IO;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let executed = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&executed);
//!
//! let io = IO::from_thunk(move || counter.fetch_add(1, Ordering::SeqCst) + 1);
//! assert_eq!(executed.load(Ordering::SeqCst), 0);
//!
//! assert_eq!(io.run(), 1);
//! assert_eq!(io.run(), 2);
//! ```
//!
//! # Failure
//!
//! A producer that panics aborts [`IO::run`] immediately; the interpreter
//! performs no recovery. Use [`IO::try_run`] at the program edge to turn the
//! panic into an [`EffectError`].

use std::convert::Infallible;
use std::fmt;
use std::marker::PhantomData;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex, PoisonError};

use super::interpreter::{self, Completed, Erased, Halt, Node, RunOptions};
use super::EffectError;

/// A stack-safe description of a synchronous computation producing `A`.
///
/// `IO<A>` is a cheap handle to an immutable graph. Cloning it shares the
/// graph, and it is `Send + Sync` whatever `A` is, so independent threads may
/// run the same graph concurrently; every run owns its private continuation
/// stack.
///
/// # Monad Laws
///
/// `IO` satisfies the monad laws (compared by running both sides):
///
/// 1. **Left Identity**: `IO::of(a).flat_map(f) == f(a)`
/// 2. **Right Identity**: `m.flat_map(IO::of) == m`
/// 3. **Associativity**: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
pub struct IO<A> {
    node: Arc<Node>,
    _result: PhantomData<fn() -> A>,
}

static_assertions::assert_impl_all!(IO<std::rc::Rc<i32>>: Send, Sync, Clone);

impl<A> Clone for IO<A> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            _result: PhantomData,
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl<A: 'static> IO<A> {
    const fn from_node(node: Arc<Node>) -> Self {
        Self {
            node,
            _result: PhantomData,
        }
    }

    /// Creates an IO action from a producer.
    ///
    /// The producer runs once per interpretation, never at construction.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::IO;
    ///
    /// let io = IO::from_thunk(|| 10 + 20);
    /// assert_eq!(io.run(), 30);
    /// ```
    pub fn from_thunk<F>(producer: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self::from_node(Arc::new(Node::Leaf(Arc::new(move || {
            Box::new(producer()) as Erased
        }))))
    }

    /// Wraps a pure value.
    ///
    /// Each run yields a fresh clone of `value`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::IO;
    ///
    /// assert_eq!(IO::of("ready").run(), "ready");
    /// ```
    pub fn of(value: A) -> Self
    where
        A: Clone + Send + Sync,
    {
        Self::from_thunk(move || value.clone())
    }

    /// Alias for [`of`](Self::of).
    #[inline]
    pub fn pure(value: A) -> Self
    where
        A: Clone + Send + Sync,
    {
        Self::of(value)
    }

    /// Wraps a value that the interpreter reads exactly once.
    ///
    /// Only for leaves built fresh by a continuation, which the interpreter
    /// visits a single time.
    fn once(value: A) -> Self
    where
        A: Send,
    {
        let slot = Mutex::new(Some(value));
        Self::from_thunk(move || {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .expect("A one-shot leaf is visited at most once")
        })
    }
}

// =============================================================================
// Combinators
// =============================================================================

impl<A: 'static> IO<A> {
    /// Chains a computation that depends on this one's value.
    ///
    /// Builds a `Bind` node; nothing runs until the graph is interpreted.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::IO;
    ///
    /// let io = IO::of(10).flat_map(|x| IO::of(x * 2));
    /// assert_eq!(io.run(), 20);
    /// ```
    pub fn flat_map<B, F>(self, function: F) -> IO<B>
    where
        F: Fn(A) -> IO<B> + Send + Sync + 'static,
        B: 'static,
    {
        let continuation = move |value: Erased| function(interpreter::downcast::<A>(value)).node;
        IO::from_node(Arc::new(Node::Bind {
            predecessor: self.node,
            continuation: Arc::new(continuation),
        }))
    }

    /// Alias for [`flat_map`](Self::flat_map).
    #[inline]
    pub fn and_then<B, F>(self, function: F) -> IO<B>
    where
        F: Fn(A) -> IO<B> + Send + Sync + 'static,
        B: 'static,
    {
        self.flat_map(function)
    }

    /// Transforms the value of this computation.
    ///
    /// Defined as `flat_map` into a fresh leaf, so the graph only ever holds
    /// the two primitive node shapes. The leaf hands its value over once, so
    /// `B` need not be `Clone`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::IO;
    ///
    /// let io = IO::of(21).map(|x| x * 2);
    /// assert_eq!(io.run(), 42);
    /// ```
    pub fn map<B, F>(self, function: F) -> IO<B>
    where
        F: Fn(A) -> B + Send + Sync + 'static,
        B: Send + 'static,
    {
        self.flat_map(move |value| IO::once(function(value)))
    }

    /// Sequences two computations, discarding the value of the first.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::IO;
    ///
    /// let io = IO::of(10).then(IO::of(20));
    /// assert_eq!(io.run(), 20);
    /// ```
    pub fn then<B: 'static>(self, next: IO<B>) -> IO<B> {
        self.flat_map(move |_| next.clone())
    }

    /// Repeats this computation indefinitely.
    ///
    /// The returned graph is unbounded but built lazily: each iteration's
    /// `Bind` node is created only when the interpreter reaches it, and the
    /// continuation stack shows no net growth from one iteration to the next.
    /// The result type is uninhabited, so a run can end only by panicking or,
    /// under [`run_with`](Self::run_with), by exhausting its step limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::{EffectError, IO, RunOptions};
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// let ticks = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&ticks);
    /// let ticking = IO::from_thunk(move || {
    ///     counter.fetch_add(1, Ordering::SeqCst);
    /// })
    /// .forever();
    ///
    /// let outcome = ticking.run_with(&RunOptions::default().with_step_limit(1_000));
    /// assert!(matches!(outcome, Err(EffectError::StepLimitExceeded { .. })));
    /// assert!(ticks.load(Ordering::SeqCst) > 0);
    /// ```
    pub fn forever(self) -> IO<Infallible> {
        let again = self.clone();
        self.flat_map(move |_| again.clone().forever())
    }
}

// =============================================================================
// Interpretation
// =============================================================================

impl<A: 'static> IO<A> {
    /// Interprets the graph and returns its value.
    ///
    /// Uses constant native stack space regardless of how many `flat_map`
    /// steps are chained. Side effects happen here and nowhere else.
    ///
    /// # Panics
    ///
    /// A panic raised by a producer or continuation propagates to the caller
    /// unchanged; the run is abandoned at that point.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::IO;
    ///
    /// let mut io = IO::of(0_u64);
    /// for _ in 0..100_000 {
    ///     io = io.flat_map(|x| IO::of(x + 1));
    /// }
    /// assert_eq!(io.run(), 100_000);
    /// ```
    pub fn run(&self) -> A {
        match interpreter::interpret(&self.node, &RunOptions::new()) {
            Halt::Finished(value, _) => interpreter::downcast(value),
            Halt::LimitReached(_) => unreachable!("an unbounded run has no step limit to reach"),
        }
    }

    /// Interprets the graph under `options`, reporting counters.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::StepLimitExceeded`] when the run visits more
    /// nodes than `options.step_limit` allows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::{IO, RunOptions};
    ///
    /// let io = IO::of(1).flat_map(|x| IO::of(x + 1));
    /// let completed = io.run_with(&RunOptions::default()).unwrap();
    /// assert_eq!(completed.value, 2);
    /// assert_eq!(completed.stats.peak_stack_depth, 1);
    /// ```
    pub fn run_with(&self, options: &RunOptions) -> Result<Completed<A>, EffectError> {
        interpreter::complete(interpreter::interpret(&self.node, options), options)
    }

    /// Interprets the graph, capturing a panic as an error.
    ///
    /// This is the edge adapter between the unchecked core and callers that
    /// want a value for every outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::Panicked`] with the panic message when a
    /// producer or continuation panics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::{EffectError, IO};
    ///
    /// let failing = IO::from_thunk(|| -> i32 { panic!("disk on fire") });
    /// assert_eq!(
    ///     failing.try_run(),
    ///     Err(EffectError::Panicked { message: "disk on fire".to_string() })
    /// );
    /// ```
    pub fn try_run(&self) -> Result<A, EffectError> {
        catch_unwind(AssertUnwindSafe(|| self.run())).map_err(|payload| {
            let error = EffectError::from_panic(payload.as_ref());
            tracing::warn!(%error, "captured panic while interpreting graph");
            error
        })
    }
}

impl<A> fmt::Debug for IO<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &*self.node {
            Node::Leaf(_) => "<leaf>",
            Node::Bind { .. } => "<bind>",
        };
        formatter.debug_tuple("IO").field(&shape).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[rstest]
    fn of_and_run() {
        assert_eq!(IO::of(42).run(), 42);
    }

    #[rstest]
    fn from_thunk_and_run() {
        assert_eq!(IO::from_thunk(|| 10 + 20).run(), 30);
    }

    #[rstest]
    fn map_transforms_value() {
        assert_eq!(IO::of(21).map(|x| x * 2).run(), 42);
    }

    #[rstest]
    fn flat_map_chains() {
        assert_eq!(IO::of(10).flat_map(|x| IO::of(x * 2)).run(), 20);
    }

    #[rstest]
    fn then_discards_first_value_but_runs_it() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let io = IO::from_thunk(move || counter.fetch_add(1, Ordering::SeqCst)).then(IO::of("done"));
        assert_eq!(io.run(), "done");
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn construction_has_no_side_effects() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let _io = IO::from_thunk(move || counter.fetch_add(1, Ordering::SeqCst))
            .map(|x| x + 1)
            .flat_map(IO::of)
            .forever();
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn debug_shows_node_shape() {
        assert_eq!(format!("{:?}", IO::of(1)), "IO(\"<leaf>\")");
        assert_eq!(format!("{:?}", IO::of(1).map(|x| x)), "IO(\"<bind>\")");
    }

    #[rstest]
    fn run_with_counts_steps() {
        let completed = IO::of(1)
            .map(|x| x + 1)
            .map(|x| x + 1)
            .run_with(&RunOptions::default())
            .unwrap();
        assert_eq!(completed.value, 3);
        assert_eq!(completed.stats.steps, 5);
        assert_eq!(completed.stats.peak_stack_depth, 2);
    }
}
