//! Heap-resident stack of pending continuations.
//!
//! Both interpreters ([`IO`](crate::effect::IO) and
//! [`AsyncIO`](crate::effect::AsyncIO)) replace native recursion with this
//! structure: descending into a `Bind` node pushes its continuation, and every
//! value produced by a leaf pops the most recent one.
//!
//! # Invariants
//!
//! - **LIFO Order**: the continuation pushed last is applied first
//! - **Single Owner**: a stack belongs to exactly one interpretation and is
//!   never shared; it does not implement `Clone`
//! - **Peak Tracking**: `peak_depth` never decreases during a run

use smallvec::SmallVec;

/// Number of continuations stored inline before spilling to the heap.
const INLINE_CAPACITY: usize = 8;

/// LIFO stack of continuations with peak-depth tracking.
///
/// Short chains (eight pending continuations or fewer) are kept inline;
/// deeper chains grow on the heap without bound.
pub(crate) struct ContinuationStack<K> {
    continuations: SmallVec<[K; INLINE_CAPACITY]>,
    peak_depth: usize,
}

impl<K> ContinuationStack<K> {
    /// Creates an empty stack that can hold `capacity` continuations before
    /// reallocating.
    #[inline]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            continuations: SmallVec::with_capacity(capacity),
            peak_depth: 0,
        }
    }

    /// Pushes a continuation on top of the stack.
    #[inline]
    pub(crate) fn push(&mut self, continuation: K) {
        self.continuations.push(continuation);
        self.peak_depth = self.peak_depth.max(self.continuations.len());
    }

    /// Removes and returns the most recently pushed continuation.
    #[inline]
    pub(crate) fn pop(&mut self) -> Option<K> {
        self.continuations.pop()
    }

    /// Returns the number of pending continuations.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.continuations.len()
    }

    /// Returns the largest number of continuations held at once.
    #[inline]
    pub(crate) const fn peak_depth(&self) -> usize {
        self.peak_depth
    }
}

impl<K> Default for ContinuationStack<K> {
    fn default() -> Self {
        Self::with_capacity(INLINE_CAPACITY)
    }
}
