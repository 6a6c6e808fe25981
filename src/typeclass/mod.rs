//! Type class traits shared by the validation and effect modules.
//!
//! - [`Semigroup`]: Associative binary operations, used as the combine
//!   function when accumulating validation failures.
//! - [`Monoid`]: Semigroups with an identity element.
//!
//! # Examples
//!
//! ```rust
//! use stackless::typeclass::Semigroup;
//!
//! let vec1 = vec![1, 2];
//! let vec2 = vec![3, 4];
//! assert_eq!(vec1.combine(vec2), vec![1, 2, 3, 4]);
//! ```

mod monoid;
mod semigroup;

pub use monoid::Monoid;
pub use semigroup::{Semigroup, separated_by};
