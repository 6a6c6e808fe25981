//! Error-accumulating validation over many outcomes.
//!
//! [`validate_all`] generalizes [`Outcome::zip_validate`] from two operands to
//! an ordered sequence, and [`ValidateAll`] does the same for tuples whose
//! success payloads have different types. Both inspect every operand: when
//! any operand fails, the failures are folded left-to-right in operand order
//! and every success payload is discarded.
//!
//! # Examples
//!
//! ```rust
//! use stackless::control::{Outcome, ValidateAll};
//! use stackless::typeclass::separated_by;
//!
//! fn first_name(input: &str) -> Outcome<String, String> {
//!     if input.is_empty() {
//!         Outcome::failure("first name is empty".to_string())
//!     } else {
//!         Outcome::success(input.to_string())
//!     }
//! }
//!
//! fn age(input: i64) -> Outcome<String, u8> {
//!     u8::try_from(input)
//!         .map_err(|_| format!("age {input} is out of range"))
//!         .into()
//! }
//!
//! let person = (first_name(""), age(-1)).validate_all(separated_by(" | "));
//! assert_eq!(
//!     person,
//!     Outcome::failure("first name is empty | age -1 is out of range".to_string())
//! );
//! ```

use super::Outcome;

/// Folds an error into the running accumulator, keeping operand order.
fn accumulate<E, F>(accumulated: Option<E>, error: E, combine: &mut F) -> Option<E>
where
    F: FnMut(E, E) -> E,
{
    Some(match accumulated {
        Some(previous) => combine(previous, error),
        None => error,
    })
}

/// Validates every outcome of a homogeneous sequence.
///
/// Returns `Success` with all payloads in order when every operand succeeds.
/// Otherwise returns `Failure` holding the left-to-right fold of every
/// failure with `combine`; a single failure is returned as-is and `combine`
/// is not called. An empty sequence yields `Success(vec![])`.
///
/// # Examples
///
/// ```rust
/// use stackless::control::{Outcome, validate_all};
/// use stackless::typeclass::separated_by;
///
/// let all_good = validate_all(
///     vec![Outcome::<String, i32>::success(1), Outcome::success(2), Outcome::success(3)],
///     separated_by(" | "),
/// );
/// assert_eq!(all_good, Outcome::success(vec![1, 2, 3]));
///
/// let mixed = validate_all(
///     vec![
///         Outcome::<String, i32>::failure("a".to_string()),
///         Outcome::success(1),
///         Outcome::failure("b".to_string()),
///     ],
///     separated_by(" | "),
/// );
/// assert_eq!(mixed, Outcome::failure("a | b".to_string()));
/// ```
pub fn validate_all<E, A, I, F>(outcomes: I, mut combine: F) -> Outcome<E, Vec<A>>
where
    I: IntoIterator<Item = Outcome<E, A>>,
    F: FnMut(E, E) -> E,
{
    let iterator = outcomes.into_iter();
    let mut values = Vec::with_capacity(iterator.size_hint().0);
    let mut accumulated: Option<E> = None;

    for outcome in iterator {
        match outcome {
            Outcome::Success(value) => {
                if accumulated.is_none() {
                    values.push(value);
                }
            }
            Outcome::Failure(error) => {
                if accumulated.is_none() {
                    values.clear();
                }
                accumulated = accumulate(accumulated, error, &mut combine);
            }
        }
    }

    match accumulated {
        Some(error) => Outcome::Failure(error),
        None => Outcome::Success(values),
    }
}

/// Error-accumulating validation for tuples of outcomes.
///
/// Implemented for tuples of one to eight `Outcome<E, _>` values sharing the
/// error type `E`. See [`validate_all`] for the folding rules.
pub trait ValidateAll<E> {
    /// The tuple of success payloads.
    type Output;

    /// Validates every element, folding failures left-to-right with `combine`.
    fn validate_all<F>(self, combine: F) -> Outcome<E, Self::Output>
    where
        F: FnMut(E, E) -> E;
}

macro_rules! impl_validate_all {
    ($($value:ident : $type:ident @ $index:tt),+) => {
        impl<E, $($type),+> ValidateAll<E> for ($(Outcome<E, $type>,)+) {
            type Output = ($($type,)+);

            fn validate_all<F>(self, mut combine: F) -> Outcome<E, Self::Output>
            where
                F: FnMut(E, E) -> E,
            {
                let mut accumulated: Option<E> = None;
                $(
                    let $value = match self.$index {
                        Outcome::Success(value) => Some(value),
                        Outcome::Failure(error) => {
                            accumulated = accumulate(accumulated.take(), error, &mut combine);
                            None
                        }
                    };
                )+

                if let Some(error) = accumulated {
                    return Outcome::Failure(error);
                }

                match ($($value,)+) {
                    ($(Some($value),)+) => Outcome::Success(($($value,)+)),
                    _ => unreachable!("no failure was accumulated, so every operand succeeded"),
                }
            }
        }
    };
}

impl_validate_all!(a: A @ 0);
impl_validate_all!(a: A @ 0, b: B @ 1);
impl_validate_all!(a: A @ 0, b: B @ 1, c: C @ 2);
impl_validate_all!(a: A @ 0, b: B @ 1, c: C @ 2, d: D @ 3);
impl_validate_all!(a: A @ 0, b: B @ 1, c: C @ 2, d: D @ 3, e: G @ 4);
impl_validate_all!(a: A @ 0, b: B @ 1, c: C @ 2, d: D @ 3, e: G @ 4, f: H @ 5);
impl_validate_all!(a: A @ 0, b: B @ 1, c: C @ 2, d: D @ 3, e: G @ 4, f: H @ 5, g: I @ 6);
impl_validate_all!(
    a: A @ 0, b: B @ 1, c: C @ 2, d: D @ 3, e: G @ 4, f: H @ 5, g: I @ 6, h: J @ 7
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeclass::{Semigroup, separated_by};
    use rstest::rstest;

    type Checked = Outcome<String, i32>;

    fn fail(message: &str) -> Checked {
        Outcome::failure(message.to_string())
    }

    #[rstest]
    fn all_successes_keep_order() {
        let result = validate_all(
            vec![Checked::success(1), Checked::success(2), Checked::success(3)],
            separated_by(" | "),
        );
        assert_eq!(result, Outcome::success(vec![1, 2, 3]));
    }

    #[rstest]
    fn failures_fold_in_operand_order() {
        let result = validate_all(
            vec![fail("a"), Checked::success(1), fail("b")],
            separated_by(" | "),
        );
        assert_eq!(result, Outcome::failure("a | b".to_string()));
    }

    #[rstest]
    fn single_failure_does_not_call_combine() {
        let result = validate_all(vec![Checked::success(1), fail("only")], |_, _| {
            unreachable!("combine needs two failures")
        });
        assert_eq!(result, Outcome::failure("only".to_string()));
    }

    #[rstest]
    fn empty_sequence_succeeds() {
        let result = validate_all(Vec::<Checked>::new(), separated_by(" | "));
        assert_eq!(result, Outcome::success(Vec::new()));
    }

    #[rstest]
    fn combine_sees_every_failure_once() {
        let mut calls = 0;
        let result = validate_all(vec![fail("a"), fail("b"), fail("c"), fail("d")], |x, y| {
            calls += 1;
            format!("{x}{y}")
        });
        assert_eq!(result, Outcome::failure("abcd".to_string()));
        assert_eq!(calls, 3);
    }

    #[rstest]
    fn tuple_of_successes_keeps_types() {
        let result = (
            Outcome::<String, i32>::success(1),
            Outcome::success("two"),
            Outcome::success(3.0),
        )
            .validate_all(separated_by(" | "));
        assert_eq!(result, Outcome::success((1, "two", 3.0)));
    }

    #[rstest]
    fn tuple_failures_fold_left_to_right() {
        let result = (
            Outcome::<Vec<&str>, i32>::failure(vec!["first"]),
            Outcome::<Vec<&str>, bool>::success(true),
            Outcome::<Vec<&str>, char>::failure(vec!["third"]),
        )
            .validate_all(Semigroup::combine);
        assert_eq!(result, Outcome::failure(vec!["first", "third"]));
    }

    #[rstest]
    fn eight_element_tuple_is_supported() {
        let result = (
            Checked::success(1),
            Checked::success(2),
            Checked::success(3),
            Checked::success(4),
            Checked::success(5),
            Checked::success(6),
            Checked::success(7),
            fail("eighth"),
        )
            .validate_all(separated_by(" | "));
        assert_eq!(result, Outcome::failure("eighth".to_string()));
    }
}
