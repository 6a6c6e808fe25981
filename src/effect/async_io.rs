//! `AsyncIO` - Deferred asynchronous computations.
//!
//! The `AsyncIO` type describes an asynchronous computation. Side effects are
//! not executed until the future returned by [`AsyncIO::run`] is polled,
//! maintaining referential transparency in pure code.
//!
//! # Design Philosophy
//!
//! `AsyncIO` shares its combinator names and laws with [`IO`]: `of`,
//! `from_thunk`, `map`, `flat_map`, `forever`. It is built from the same two
//! node shapes, except that a leaf produces a future instead of a value.
//!
//! The interpreter is a single future that walks the graph with an explicit
//! continuation stack and awaits one leaf at a time. Chaining `flat_map`
//! therefore never nests futures inside futures, and polling a chain of a
//! hundred thousand steps uses the same native stack as polling one.
//!
//! # Scheduling
//!
//! Suspension happens only where a leaf awaits something (an async producer,
//! a timer). Within one chain, steps run in construction order. There is no
//! cancellation contract beyond dropping the future; [`AsyncIO::delay`] and
//! [`AsyncIO::forever`] cannot be interrupted from inside.
//!
//! A panic inside a producer surfaces as a panic of the polled future
//! (a `JoinError` when the future runs on a spawned tokio task).
//!
//! # Examples
//!
//! ```rust
//! use stackless::effect::AsyncIO;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let async_io = AsyncIO::of(10)
//!         .map(|x| x * 2)
//!         .flat_map(|x| AsyncIO::of(x + 1));
//!     assert_eq!(async_io.run().await, 21);
//! }
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use std::mem;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::control::{ContinuationStack, Orphans, release};

use super::IO;

type AsyncErased = Box<dyn Any + Send>;

type AsyncProducer = Arc<dyn Fn() -> BoxFuture<'static, AsyncErased> + Send + Sync>;

type AsyncContinuation = Arc<dyn Fn(AsyncErased) -> Arc<AsyncNode> + Send + Sync>;

enum AsyncNode {
    Leaf(AsyncProducer),
    Bind {
        predecessor: Arc<AsyncNode>,
        continuation: AsyncContinuation,
    },
}

static NO_PRODUCER: LazyLock<AsyncProducer> =
    LazyLock::new(|| Arc::new(|| futures::future::ready(Box::new(()) as AsyncErased).boxed()));
static DETACHED: LazyLock<Arc<AsyncNode>> =
    LazyLock::new(|| Arc::new(AsyncNode::Leaf(Arc::clone(&NO_PRODUCER))));
static NO_CONTINUATION: LazyLock<AsyncContinuation> =
    LazyLock::new(|| Arc::new(|_: AsyncErased| Arc::clone(&DETACHED)));

enum AsyncOrphan {
    Node(Arc<AsyncNode>),
    Producer(AsyncProducer),
    Continuation(AsyncContinuation),
}

impl AsyncOrphan {
    fn is_last_reference(&self) -> bool {
        match self {
            Self::Node(node) => Arc::strong_count(node) == 1,
            Self::Producer(producer) => Arc::strong_count(producer) == 1,
            Self::Continuation(continuation) => Arc::strong_count(continuation) == 1,
        }
    }
}

thread_local! {
    static ORPHANS: Orphans<AsyncOrphan> = const { RefCell::new(None) };
}

impl Drop for AsyncNode {
    fn drop(&mut self) {
        let orphans = match self {
            Self::Leaf(producer) => [
                Some(AsyncOrphan::Producer(mem::replace(
                    producer,
                    Arc::clone(&NO_PRODUCER),
                ))),
                None,
            ],
            Self::Bind {
                predecessor,
                continuation,
            } => [
                Some(AsyncOrphan::Node(mem::replace(
                    predecessor,
                    Arc::clone(&DETACHED),
                ))),
                Some(AsyncOrphan::Continuation(mem::replace(
                    continuation,
                    Arc::clone(&NO_CONTINUATION),
                ))),
            ],
        };
        let orphans = orphans.map(|orphan| orphan.filter(AsyncOrphan::is_last_reference));
        if orphans.iter().any(Option::is_some) {
            release(&ORPHANS, orphans.into_iter().flatten());
        }
    }
}

/// One move of the async interpreter.
enum Step {
    Descend(Arc<AsyncNode>),
    Await(BoxFuture<'static, AsyncErased>),
}

/// Drives `root` to completion, awaiting one leaf at a time.
async fn drive(root: Arc<AsyncNode>) -> AsyncErased {
    let mut stack: ContinuationStack<AsyncContinuation> = ContinuationStack::default();
    let mut current = root;

    loop {
        let step = match &*current {
            AsyncNode::Leaf(producer) => Step::Await(producer()),
            AsyncNode::Bind {
                predecessor,
                continuation,
            } => {
                stack.push(Arc::clone(continuation));
                Step::Descend(Arc::clone(predecessor))
            }
        };

        current = match step {
            Step::Descend(next) => next,
            Step::Await(future) => {
                let value = future.await;
                match stack.pop() {
                    Some(continuation) => continuation(value),
                    None => {
                        tracing::trace!(
                            peak_stack_depth = stack.peak_depth(),
                            "async graph interpretation finished"
                        );
                        return value;
                    }
                }
            }
        };
    }
}

fn downcast<A: 'static>(value: AsyncErased) -> A {
    *value
        .downcast::<A>()
        .expect("Type mismatch between async graph node and continuation")
}

/// A stack-safe description of an asynchronous computation producing `A`.
///
/// Cloning shares the graph. The same `AsyncIO` can be run many times; each
/// run re-executes every producer.
///
/// # Monad Laws
///
/// 1. **Left Identity**: `AsyncIO::of(a).flat_map(f) == f(a)`
/// 2. **Right Identity**: `m.flat_map(AsyncIO::of) == m`
/// 3. **Associativity**: `m.flat_map(f).flat_map(g) == m.flat_map(|x| f(x).flat_map(g))`
pub struct AsyncIO<A> {
    node: Arc<AsyncNode>,
    _result: PhantomData<fn() -> A>,
}

static_assertions::assert_impl_all!(AsyncIO<i32>: Send, Sync, Clone);

impl<A> Clone for AsyncIO<A> {
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

impl<A: Send + 'static> AsyncIO<A> {
    const fn from_node(node: Arc<AsyncNode>) -> Self {
        Self {
            node,
            _result: PhantomData,
        }
    }

    /// Creates an `AsyncIO` from a synchronous producer.
    ///
    /// The producer runs when the interpreter reaches it, never at
    /// construction and never before the returned future is polled.
    pub fn from_thunk<F>(producer: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self::from_node(Arc::new(AsyncNode::Leaf(Arc::new(move || {
            futures::future::ready(Box::new(producer()) as AsyncErased).boxed()
        }))))
    }

    /// Creates an `AsyncIO` from a producer of futures.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::AsyncIO;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let async_io = AsyncIO::from_async(|| async {
    ///     tokio::time::sleep(Duration::from_millis(1)).await;
    ///     42
    /// });
    /// assert_eq!(async_io.run().await, 42);
    /// # }
    /// ```
    pub fn from_async<F, Fut>(action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = A> + Send + 'static,
    {
        Self::from_node(Arc::new(AsyncNode::Leaf(Arc::new(move || {
            action().map(|value| Box::new(value) as AsyncErased).boxed()
        }))))
    }

    /// Wraps a pure value. Each run yields a fresh clone.
    pub fn of(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::from_thunk(move || value.clone())
    }

    /// Alias for [`of`](Self::of).
    #[inline]
    pub fn pure(value: A) -> Self
    where
        A: Clone + Sync,
    {
        Self::of(value)
    }

    /// Wraps a value that the interpreter reads exactly once.
    ///
    /// Only for leaves built fresh by a continuation, which the interpreter
    /// visits a single time.
    fn once(value: A) -> Self {
        let slot = Mutex::new(Some(value));
        Self::from_thunk(move || {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .expect("A one-shot leaf is visited at most once")
        })
    }

    /// Lifts a synchronous graph; it is interpreted when this leaf is reached.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::{AsyncIO, IO};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let sync = IO::of(20).map(|x| x + 1);
    /// assert_eq!(AsyncIO::from_io(sync).map(|x| x * 2).run().await, 42);
    /// # }
    /// ```
    pub fn from_io(io: IO<A>) -> Self {
        Self::from_thunk(move || io.run())
    }
}

impl AsyncIO<()> {
    /// Waits for `duration` on the tokio timer.
    pub fn sleep(duration: Duration) -> Self {
        Self::from_async(move || {
            tracing::trace!(?duration, "async delay started");
            tokio::time::sleep(duration)
        })
    }
}

// =============================================================================
// Combinators
// =============================================================================

impl<A: Send + 'static> AsyncIO<A> {
    /// Chains an asynchronous computation that depends on this one's value.
    pub fn flat_map<B, F>(self, function: F) -> AsyncIO<B>
    where
        F: Fn(A) -> AsyncIO<B> + Send + Sync + 'static,
        B: Send + 'static,
    {
        let continuation = move |value: AsyncErased| function(downcast::<A>(value)).node;
        AsyncIO::from_node(Arc::new(AsyncNode::Bind {
            predecessor: self.node,
            continuation: Arc::new(continuation),
        }))
    }

    /// Alias for [`flat_map`](Self::flat_map).
    #[inline]
    pub fn and_then<B, F>(self, function: F) -> AsyncIO<B>
    where
        F: Fn(A) -> AsyncIO<B> + Send + Sync + 'static,
        B: Send + 'static,
    {
        self.flat_map(function)
    }

    /// Transforms the value; defined as `flat_map` into a fresh leaf.
    ///
    /// The result type needs neither `Clone` nor `Sync`, since each leaf built
    /// here is visited once.
    pub fn map<B, F>(self, function: F) -> AsyncIO<B>
    where
        F: Fn(A) -> B + Send + Sync + 'static,
        B: Send + 'static,
    {
        self.flat_map(move |value| AsyncIO::once(function(value)))
    }

    /// Sequences two computations, discarding the value of the first.
    pub fn then<B: Send + 'static>(self, next: AsyncIO<B>) -> AsyncIO<B> {
        self.flat_map(move |_| next.clone())
    }

    /// Runs this effect `count` times, one after another.
    ///
    /// Each invocation is awaited before the next one starts, and the values
    /// are collected in order. `count == 0` yields an empty `Vec` without
    /// invoking the effect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::AsyncIO;
    /// use std::sync::atomic::{AtomicUsize, Ordering};
    /// use std::sync::Arc;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let calls = Arc::new(AtomicUsize::new(0));
    /// let counter = Arc::clone(&calls);
    /// let next = AsyncIO::from_thunk(move || counter.fetch_add(1, Ordering::SeqCst));
    ///
    /// assert_eq!(next.clone().repeat(3).run().await, vec![0, 1, 2]);
    /// assert_eq!(next.repeat(0).run().await, Vec::<usize>::new());
    /// assert_eq!(calls.load(Ordering::SeqCst), 3);
    /// # }
    /// ```
    pub fn repeat(self, count: usize) -> AsyncIO<Vec<A>> {
        AsyncIO::from_async(move || {
            let effect = self.clone();
            async move {
                let mut values = Vec::with_capacity(count);
                for iteration in 0..count {
                    tracing::trace!(iteration, count, "async repeat iteration");
                    values.push(effect.run().await);
                }
                values
            }
        })
    }

    /// Waits at least `duration` before running this effect.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::effect::AsyncIO;
    /// use std::time::Duration;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let started = std::time::Instant::now();
    /// let value = AsyncIO::of(7).delay(Duration::from_millis(10)).run().await;
    /// assert_eq!(value, 7);
    /// assert!(started.elapsed() >= Duration::from_millis(10));
    /// # }
    /// ```
    pub fn delay(self, duration: Duration) -> Self {
        AsyncIO::sleep(duration).then(self)
    }

    /// Repeats this effect indefinitely.
    ///
    /// The result type is uninhabited: the returned future never resolves,
    /// and ends only when it is dropped or a producer panics. Like
    /// [`IO::forever`], each iteration is built lazily.
    ///
    /// The loop yields to the executor only where a leaf awaits. A body made
    /// of synchronous leaves alone never suspends, so it cannot be stopped by
    /// a timeout on the same task.
    pub fn forever(self) -> AsyncIO<Infallible> {
        let again = self.clone();
        self.flat_map(move |_| again.clone().forever())
    }
}

// =============================================================================
// Execution
// =============================================================================

impl<A: Send + 'static> AsyncIO<A> {
    /// Starts an interpretation and returns its future.
    ///
    /// Nothing runs until the future is polled. Each call starts an
    /// independent run.
    pub fn run(&self) -> BoxFuture<'static, A> {
        drive(Arc::clone(&self.node)).map(downcast::<A>).boxed()
    }
}

impl<A: Send + 'static> IntoFuture for AsyncIO<A> {
    type Output = A;
    type IntoFuture = BoxFuture<'static, A>;

    fn into_future(self) -> Self::IntoFuture {
        self.run()
    }
}

impl<A> fmt::Debug for AsyncIO<A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match &*self.node {
            AsyncNode::Leaf(_) => "<leaf>",
            AsyncNode::Bind { .. } => "<bind>",
        };
        formatter.debug_tuple("AsyncIO").field(&shape).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[rstest]
    #[tokio::test]
    async fn of_and_run() {
        assert_eq!(AsyncIO::of(42).run().await, 42);
    }

    #[rstest]
    #[tokio::test]
    async fn into_future_allows_direct_await() {
        assert_eq!(AsyncIO::of(21).map(|x| x * 2).await, 42);
    }

    #[rstest]
    #[tokio::test]
    async fn construction_and_run_call_are_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let async_io = AsyncIO::from_thunk(move || counter.fetch_add(1, Ordering::SeqCst));

        let future = async_io.run();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        future.await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn deep_flat_map_chain_is_stack_safe() {
        let mut async_io = AsyncIO::of(0_u64);
        for _ in 0..100_000 {
            async_io = async_io.flat_map(|x| AsyncIO::of(x + 1));
        }
        assert_eq!(async_io.run().await, 100_000);
    }

    #[rstest]
    #[tokio::test]
    async fn debug_shows_node_shape() {
        assert_eq!(format!("{:?}", AsyncIO::of(1)), "AsyncIO(\"<leaf>\")");
        assert_eq!(
            format!("{:?}", AsyncIO::of(1).then(AsyncIO::of(2))),
            "AsyncIO(\"<bind>\")"
        );
    }
}
