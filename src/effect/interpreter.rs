//! Trampolined interpreter for [`IO`](super::IO) graphs.
//!
//! A graph has exactly two node shapes:
//!
//! ```text
//! Node = Leaf(producer)                      -- run producer, yield its value
//!      | Bind { predecessor, continuation }  -- run predecessor, feed value to
//!                                               continuation, run the result
//! ```
//!
//! The interpreter walks the graph with a loop and an explicit
//! [`ContinuationStack`] instead of native recursion:
//!
//! 1. `Bind`: push `continuation`, descend into `predecessor`
//! 2. `Leaf`: invoke the producer; pop the top continuation and apply it to
//!    obtain the next node, or finish when the stack is empty
//!
//! Native stack depth stays constant regardless of how many `Bind` nodes are
//! chained; only the heap-allocated continuation stack grows.
//!
//! Values travel through the loop type-erased as `Box<dyn Any>` and are
//! re-typed at the `IO<A>` boundary.

use std::any::Any;
use std::cell::RefCell;
use std::mem;
use std::sync::{Arc, LazyLock};

use crate::control::{ContinuationStack, Orphans, release};

use super::EffectError;

/// A value produced inside the interpreter with its type erased.
pub(crate) type Erased = Box<dyn Any>;

/// Shared zero-argument producer stored in a `Leaf`.
pub(crate) type Producer = Arc<dyn Fn() -> Erased + Send + Sync>;

/// Shared continuation stored in a `Bind`.
pub(crate) type Continuation = Arc<dyn Fn(Erased) -> Arc<Node> + Send + Sync>;

/// A node of the computation graph.
pub(crate) enum Node {
    Leaf(Producer),
    Bind {
        predecessor: Arc<Node>,
        continuation: Continuation,
    },
}

/// Placeholders swapped into a node while its children are released.
static NO_PRODUCER: LazyLock<Producer> = LazyLock::new(|| Arc::new(|| Box::new(()) as Erased));
static DETACHED: LazyLock<Arc<Node>> =
    LazyLock::new(|| Arc::new(Node::Leaf(Arc::clone(&NO_PRODUCER))));
static NO_CONTINUATION: LazyLock<Continuation> =
    LazyLock::new(|| Arc::new(|_: Erased| Arc::clone(&DETACHED)));

/// A child detached from a dropped node, kept alive until the drainer drops it.
enum Orphan {
    Node(Arc<Node>),
    Producer(Producer),
    Continuation(Continuation),
}

impl Orphan {
    /// Whether dropping this child may free further nodes.
    fn is_last_reference(&self) -> bool {
        match self {
            Self::Node(node) => Arc::strong_count(node) == 1,
            Self::Producer(producer) => Arc::strong_count(producer) == 1,
            Self::Continuation(continuation) => Arc::strong_count(continuation) == 1,
        }
    }
}

thread_local! {
    static ORPHANS: Orphans<Orphan> = const { RefCell::new(None) };
}

impl Drop for Node {
    // Nodes nest through predecessors and through closure captures alike, so
    // every child goes through the deferred teardown queue.
    fn drop(&mut self) {
        let orphans = match self {
            Self::Leaf(producer) => [
                Some(Orphan::Producer(mem::replace(
                    producer,
                    Arc::clone(&NO_PRODUCER),
                ))),
                None,
            ],
            Self::Bind {
                predecessor,
                continuation,
            } => [
                Some(Orphan::Node(mem::replace(
                    predecessor,
                    Arc::clone(&DETACHED),
                ))),
                Some(Orphan::Continuation(mem::replace(
                    continuation,
                    Arc::clone(&NO_CONTINUATION),
                ))),
            ],
        };
        // Shared children only lose a reference here.
        let orphans = orphans.map(|orphan| orphan.filter(Orphan::is_last_reference));
        if orphans.iter().any(Option::is_some) {
            release(&ORPHANS, orphans.into_iter().flatten());
        }
    }
}

// =============================================================================
// Configuration and Diagnostics
// =============================================================================

/// Default number of continuations reserved before the first reallocation.
const DEFAULT_STACK_CAPACITY: usize = 16;

/// Options controlling a single interpretation.
///
/// The defaults describe an unbounded run, which is what
/// [`IO::run`](super::IO::run) uses.
///
/// # Examples
///
/// ```rust
/// use stackless::effect::RunOptions;
///
/// let options = RunOptions::default()
///     .with_step_limit(10_000)
///     .with_stack_capacity(64);
/// assert_eq!(options.step_limit, Some(10_000));
/// assert_eq!(options.stack_capacity, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RunOptions {
    /// Maximum number of nodes to visit before giving up, `None` for no limit.
    pub step_limit: Option<u64>,
    /// Continuations reserved up front on the interpreter's stack.
    pub stack_capacity: usize,
}

impl RunOptions {
    /// Creates options for an unbounded run.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step_limit: None,
            stack_capacity: DEFAULT_STACK_CAPACITY,
        }
    }

    /// Stops the run after `limit` visited nodes.
    #[must_use]
    pub const fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Reserves room for `capacity` pending continuations.
    #[must_use]
    pub const fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters collected while interpreting a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Number of nodes visited (every `Leaf` and every `Bind`).
    pub steps: u64,
    /// Largest number of continuations pending at once.
    pub peak_stack_depth: usize,
}

/// The value of a finished run together with its counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed<A> {
    /// The final value of the graph.
    pub value: A,
    /// Counters for the run that produced `value`.
    pub stats: RunStats,
}

// =============================================================================
// Interpreter Loop
// =============================================================================

/// Result of driving a graph.
pub(crate) enum Halt {
    Finished(Erased, RunStats),
    LimitReached(RunStats),
}

/// Interprets `root` until it produces a value or exceeds `options.step_limit`.
///
/// A panic raised by a producer or continuation is not intercepted.
pub(crate) fn interpret(root: &Arc<Node>, options: &RunOptions) -> Halt {
    let mut stack: ContinuationStack<Continuation> =
        ContinuationStack::with_capacity(options.stack_capacity);
    let mut current = Arc::clone(root);
    let mut steps: u64 = 0;

    tracing::trace!(step_limit = ?options.step_limit, "graph interpretation started");

    loop {
        if options.step_limit.is_some_and(|limit| steps >= limit) {
            let stats = RunStats {
                steps,
                peak_stack_depth: stack.peak_depth(),
            };
            tracing::debug!(
                steps,
                pending = stack.len(),
                peak_stack_depth = stats.peak_stack_depth,
                "graph interpretation hit its step limit"
            );
            return Halt::LimitReached(stats);
        }
        steps += 1;

        let next = match &*current {
            Node::Leaf(producer) => {
                let value = producer();
                match stack.pop() {
                    Some(continuation) => continuation(value),
                    None => {
                        let stats = RunStats {
                            steps,
                            peak_stack_depth: stack.peak_depth(),
                        };
                        tracing::trace!(
                            steps,
                            peak_stack_depth = stats.peak_stack_depth,
                            "graph interpretation finished"
                        );
                        return Halt::Finished(value, stats);
                    }
                }
            }
            Node::Bind {
                predecessor,
                continuation,
            } => {
                stack.push(Arc::clone(continuation));
                Arc::clone(predecessor)
            }
        };
        current = next;
    }
}

/// Restores the static type of an interpreter value.
///
/// # Panics
///
/// Panics if `value` is not an `A`. Graphs are only assembled through typed
/// `IO` combinators, so a mismatch indicates a bug in this crate.
pub(crate) fn downcast<A: 'static>(value: Erased) -> A {
    *value
        .downcast::<A>()
        .expect("Type mismatch between graph node and continuation")
}

/// Converts the interpreter's result into a checked run result.
pub(crate) fn complete<A: 'static>(
    halt: Halt,
    options: &RunOptions,
) -> Result<Completed<A>, EffectError> {
    match halt {
        Halt::Finished(value, stats) => Ok(Completed {
            value: downcast(value),
            stats,
        }),
        Halt::LimitReached(stats) => Err(EffectError::StepLimitExceeded {
            limit: options.step_limit.unwrap_or(stats.steps),
            stats,
        }),
    }
}
