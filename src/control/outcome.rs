//! Outcome type - an explicit success or failure value.
//!
//! This module provides the `Outcome<E, A>` type, which is either a
//! `Failure(E)` or a `Success(A)`. Unlike `std::result::Result`, the error
//! parameter comes first and the type carries an accumulating combinator,
//! [`Outcome::zip_validate`], which merges two failures through a caller
//! supplied combine function instead of stopping at the first one.
//!
//! # Examples
//!
//! ```rust
//! use stackless::control::Outcome;
//!
//! let parsed: Outcome<String, i32> = Outcome::success(21);
//! assert_eq!(parsed.map(|x| x * 2), Outcome::success(42));
//!
//! let first: Outcome<String, i32> = Outcome::failure("x".to_string());
//! let second: Outcome<String, i32> = Outcome::failure("y".to_string());
//! let merged = first.zip_validate(second, |left, right| format!("{left}+{right}"));
//! assert_eq!(merged, Outcome::failure("x+y".to_string()));
//! ```

use std::fmt;

/// A value that is either a failure carrying `E` or a success carrying `A`.
///
/// Once constructed, an `Outcome` never changes variant or payload; every
/// combinator consumes it and returns a new value.
///
/// # Type Parameters
///
/// * `E` - The error payload. Combinators that join two outcomes require both
///   sides to share it; use [`map_failure`](Self::map_failure) to align them.
/// * `A` - The success payload.
///
/// # Examples
///
/// ```rust
/// use stackless::control::Outcome;
///
/// let success: Outcome<String, i32> = Outcome::success(42);
/// let failure: Outcome<String, i32> = Outcome::failure("bad input".to_string());
///
/// assert!(success.is_success());
/// assert!(failure.is_failure());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome<E, A> {
    /// The computation failed with error `E`.
    Failure(E),
    /// The computation succeeded with value `A`.
    Success(A),
}

impl<E, A> Outcome<E, A> {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a successful outcome.
    #[inline]
    pub const fn success(value: A) -> Self {
        Self::Success(value)
    }

    /// Creates a failed outcome.
    #[inline]
    pub const fn failure(error: E) -> Self {
        Self::Failure(error)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Returns `true` if this is a `Success`.
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` if this is a `Failure`.
    #[inline]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Converts into `Some(value)` for a success, discarding any error.
    pub fn success_value(self) -> Option<A> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// Converts into `Some(error)` for a failure, discarding any value.
    pub fn failure_value(self) -> Option<E> {
        match self {
            Self::Failure(error) => Some(error),
            Self::Success(_) => None,
        }
    }

    /// Borrows the payloads without consuming the outcome.
    pub const fn as_ref(&self) -> Outcome<&E, &A> {
        match self {
            Self::Failure(error) => Outcome::Failure(error),
            Self::Success(value) => Outcome::Success(value),
        }
    }

    // =========================================================================
    // Functor / Monad
    // =========================================================================

    /// Transforms the success payload; failures pass through unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::control::Outcome;
    ///
    /// let failed: Outcome<&str, i32> = Outcome::failure("nope");
    /// assert_eq!(failed.map(|x| x + 1), Outcome::failure("nope"));
    /// ```
    pub fn map<B, F>(self, function: F) -> Outcome<E, B>
    where
        F: FnOnce(A) -> B,
    {
        match self {
            Self::Success(value) => Outcome::Success(function(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transforms the error payload; successes pass through unchanged.
    pub fn map_failure<E2, F>(self, function: F) -> Outcome<E2, A>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(function(error)),
        }
    }

    /// Chains a computation that may itself fail.
    ///
    /// On `Success` the function's outcome is returned; on `Failure` the
    /// original failure short-circuits and the function is never called.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::control::Outcome;
    ///
    /// fn half(x: i32) -> Outcome<String, i32> {
    ///     if x % 2 == 0 {
    ///         Outcome::success(x / 2)
    ///     } else {
    ///         Outcome::failure(format!("{x} is odd"))
    ///     }
    /// }
    ///
    /// assert_eq!(Outcome::success(8).flat_map(half), Outcome::success(4));
    /// assert_eq!(Outcome::success(3).flat_map(half), Outcome::failure("3 is odd".to_string()));
    /// ```
    pub fn flat_map<B, F>(self, function: F) -> Outcome<E, B>
    where
        F: FnOnce(A) -> Outcome<E, B>,
    {
        match self {
            Self::Success(value) => function(value),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Alias for [`flat_map`](Self::flat_map).
    #[inline]
    pub fn and_then<B, F>(self, function: F) -> Outcome<E, B>
    where
        F: FnOnce(A) -> Outcome<E, B>,
    {
        self.flat_map(function)
    }

    /// Reduces both variants to a single value.
    pub fn fold<T, F, G>(self, on_failure: F, on_success: G) -> T
    where
        F: FnOnce(E) -> T,
        G: FnOnce(A) -> T,
    {
        match self {
            Self::Failure(error) => on_failure(error),
            Self::Success(value) => on_success(value),
        }
    }

    // =========================================================================
    // Zipping
    // =========================================================================

    /// Pairs two outcomes, stopping at the first failure.
    ///
    /// `self`'s failure wins over `that`'s; a second failure is discarded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::control::Outcome;
    ///
    /// let left: Outcome<&str, i32> = Outcome::failure("left");
    /// let right: Outcome<&str, i32> = Outcome::failure("right");
    /// assert_eq!(left.zip(right), Outcome::failure("left"));
    /// ```
    pub fn zip<B>(self, that: Outcome<E, B>) -> Outcome<E, (A, B)> {
        match (self, that) {
            (Self::Failure(error), _) | (Outcome::Success(_), Outcome::Failure(error)) => {
                Outcome::Failure(error)
            }
            (Self::Success(first), Outcome::Success(second)) => Outcome::Success((first, second)),
        }
    }

    /// Pairs two outcomes, accumulating both failures through `combine`.
    ///
    /// - both `Failure`: `Failure(combine(self_error, that_error))`, with
    ///   `self`'s error passed as the **first** argument
    /// - exactly one `Failure`: that failure
    /// - both `Success`: `Success((a, b))`
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::control::Outcome;
    /// use stackless::typeclass::separated_by;
    ///
    /// let x: Outcome<String, i32> = Outcome::failure("x".to_string());
    /// let y: Outcome<String, bool> = Outcome::failure("y".to_string());
    /// assert_eq!(
    ///     x.zip_validate(y, separated_by(" | ")),
    ///     Outcome::failure("x | y".to_string())
    /// );
    ///
    /// let a: Outcome<String, i32> = Outcome::success(1);
    /// let b: Outcome<String, bool> = Outcome::success(true);
    /// assert_eq!(a.zip_validate(b, separated_by(" | ")), Outcome::success((1, true)));
    /// ```
    pub fn zip_validate<B, F>(self, that: Outcome<E, B>, combine: F) -> Outcome<E, (A, B)>
    where
        F: FnOnce(E, E) -> E,
    {
        match (self, that) {
            (Self::Failure(first), Outcome::Failure(second)) => {
                Outcome::Failure(combine(first, second))
            }
            (Self::Failure(error), Outcome::Success(_))
            | (Self::Success(_), Outcome::Failure(error)) => Outcome::Failure(error),
            (Self::Success(first), Outcome::Success(second)) => Outcome::Success((first, second)),
        }
    }

    /// Converts into a standard library `Result`.
    pub fn into_result(self) -> Result<A, E> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }
}

impl<E, A> From<Result<A, E>> for Outcome<E, A> {
    fn from(result: Result<A, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<E, A> From<Outcome<E, A>> for Result<A, E> {
    fn from(outcome: Outcome<E, A>) -> Self {
        outcome.into_result()
    }
}

impl<E: fmt::Debug, A: fmt::Debug> fmt::Debug for Outcome<E, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(error) => formatter.debug_tuple("Failure").field(error).finish(),
            Self::Success(value) => formatter.debug_tuple("Success").field(value).finish(),
        }
    }
}

impl<E: fmt::Display, A: fmt::Display> fmt::Display for Outcome<E, A> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failure(error) => write!(formatter, "Failure({error})"),
            Self::Success(value) => write!(formatter, "Success({value})"),
        }
    }
}
