//! Semigroup type class - types with an associative binary operation.
//!
//! A semigroup is an algebraic structure consisting of a set together with
//! an associative binary operation. Error accumulation in
//! [`Outcome::zip_validate`](crate::control::Outcome::zip_validate) and
//! [`validate_all`](crate::control::validate_all) is driven by exactly such an
//! operation, so every `Semigroup` doubles as a combine function:
//!
//! ```rust
//! use stackless::control::{Outcome, validate_all};
//! use stackless::typeclass::Semigroup;
//!
//! let outcomes = vec![
//!     Outcome::<Vec<&str>, i32>::failure(vec!["first"]),
//!     Outcome::success(2),
//!     Outcome::failure(vec!["second"]),
//! ];
//! let validated = validate_all(outcomes, Semigroup::combine);
//! assert_eq!(validated, Outcome::failure(vec!["first", "second"]));
//! ```
//!
//! # Laws
//!
//! For all `a`, `b`, `c` of type `T`:
//!
//! ```text
//! (a.combine(b)).combine(c) == a.combine(b.combine(c))
//! ```

/// A type class for types with an associative binary operation.
///
/// # Laws
///
/// All implementations must satisfy associativity:
///
/// ```text
/// (a.combine(b)).combine(c) == a.combine(b.combine(c))
/// ```
///
/// The operation need not be commutative; callers that fold errors rely on
/// the left operand being the earlier one.
///
/// # Examples
///
/// ```rust
/// use stackless::typeclass::Semigroup;
///
/// let a = String::from("foo");
/// let b = String::from("bar");
/// assert_eq!(a.combine(b), "foobar");
/// ```
pub trait Semigroup {
    /// Combines two values into one. This operation must be associative.
    #[must_use]
    fn combine(self, other: Self) -> Self;

    /// Folds every element of an iterator with [`combine`](Self::combine).
    ///
    /// Returns `None` for an empty iterator.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::typeclass::Semigroup;
    ///
    /// let words = vec![String::from("a"), String::from("b"), String::from("c")];
    /// assert_eq!(String::reduce_all(words), Some(String::from("abc")));
    /// assert_eq!(String::reduce_all(Vec::<String>::new()), None);
    /// ```
    fn reduce_all<I>(iterator: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        iterator.into_iter().reduce(Self::combine)
    }
}

impl Semigroup for String {
    fn combine(mut self, other: Self) -> Self {
        self.push_str(&other);
        self
    }
}

impl<T> Semigroup for Vec<T> {
    fn combine(mut self, mut other: Self) -> Self {
        self.append(&mut other);
        self
    }
}

impl Semigroup for () {
    fn combine(self, _other: Self) -> Self {}
}

/// Builds a combine function that joins two strings with `separator`.
///
/// The left operand is written first, so the function is order-sensitive:
/// `combine("x", "y") != combine("y", "x")`.
///
/// # Examples
///
/// ```rust
/// use stackless::typeclass::separated_by;
///
/// let join_with_pipe = separated_by(" | ");
/// assert_eq!(join_with_pipe("a".to_string(), "b".to_string()), "a | b");
/// ```
pub fn separated_by(separator: &str) -> impl Fn(String, String) -> String + Clone + use<> {
    let separator = separator.to_owned();
    move |mut left: String, right: String| {
        left.reserve(separator.len() + right.len());
        left.push_str(&separator);
        left.push_str(&right);
        left
    }
}
