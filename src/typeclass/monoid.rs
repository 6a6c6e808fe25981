//! Monoid type class - semigroups with an identity element.
//!
//! A monoid adds to [`Semigroup`] an element `empty` that leaves every value
//! unchanged when combined with it, on either side.
//!
//! # Laws
//!
//! For all `a` of type `T`:
//!
//! ```text
//! T::empty().combine(a) == a
//! a.combine(T::empty()) == a
//! ```
//!
//! # Examples
//!
//! ```rust
//! use stackless::typeclass::{Monoid, Semigroup};
//!
//! assert_eq!(String::empty().combine(String::from("hello")), "hello");
//! assert!(Vec::<i32>::empty().is_empty());
//! ```

use super::semigroup::Semigroup;

/// A type class for semigroups with an identity element.
pub trait Monoid: Semigroup {
    /// Returns the identity element.
    #[must_use]
    fn empty() -> Self;

    /// Combines every element of an iterator, starting from [`empty`](Self::empty).
    ///
    /// Unlike [`Semigroup::reduce_all`], an empty iterator yields the identity
    /// element rather than `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use stackless::typeclass::Monoid;
    ///
    /// let errors = vec![vec!["a"], vec![], vec!["b", "c"]];
    /// assert_eq!(Vec::combine_all(errors), vec!["a", "b", "c"]);
    /// assert_eq!(String::combine_all(Vec::<String>::new()), "");
    /// ```
    fn combine_all<I>(iterator: I) -> Self
    where
        I: IntoIterator<Item = Self>,
        Self: Sized,
    {
        iterator.into_iter().fold(Self::empty(), Self::combine)
    }
}

impl Monoid for String {
    fn empty() -> Self {
        Self::new()
    }
}

impl<T> Monoid for Vec<T> {
    fn empty() -> Self {
        Self::new()
    }
}

impl Monoid for () {
    fn empty() -> Self {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("hello")]
    fn string_empty_is_an_identity(#[case] text: &str) {
        assert_eq!(String::empty().combine(text.to_owned()), text);
        assert_eq!(text.to_owned().combine(String::empty()), text);
    }

    #[rstest]
    fn vec_empty_is_an_identity() {
        assert_eq!(Vec::empty().combine(vec![1, 2]), vec![1, 2]);
        assert_eq!(vec![1, 2].combine(Vec::empty()), vec![1, 2]);
    }

    #[rstest]
    fn unit_empty() {
        assert_eq!(<()>::empty(), ());
    }

    #[rstest]
    fn combine_all_of_nothing_is_empty() {
        assert_eq!(Vec::<u8>::combine_all(std::iter::empty()), Vec::<u8>::new());
    }

    #[rstest]
    fn combine_all_keeps_order() {
        let words = ["ab", "", "cd"].map(String::from);
        assert_eq!(String::combine_all(words), "abcd");
    }
}
