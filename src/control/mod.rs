//! Control structures for explicit, inspectable error handling.
//!
//! - [`Outcome`]: A success-or-failure value with accumulating combinators
//! - [`validate_all`] / [`ValidateAll`]: Validate many outcomes at once,
//!   folding every failure instead of stopping at the first
//!
//! The continuation stack and the deferred node teardown used by the effect
//! interpreters also live here.
//!
//! # Examples
//!
//! ```rust
//! use stackless::control::{Outcome, validate_all};
//! use stackless::typeclass::separated_by;
//!
//! let result = validate_all(
//!     vec![
//!         Outcome::<String, i32>::failure("a".to_string()),
//!         Outcome::success(1),
//!         Outcome::failure("b".to_string()),
//!     ],
//!     separated_by(" | "),
//! );
//! assert_eq!(result, Outcome::failure("a | b".to_string()));
//! ```

#[cfg(feature = "effect")]
mod continuation_stack;
mod outcome;
#[cfg(feature = "effect")]
mod teardown;
mod validation;

#[cfg(feature = "effect")]
pub(crate) use continuation_stack::ContinuationStack;
pub use outcome::Outcome;
#[cfg(feature = "effect")]
pub(crate) use teardown::{Orphans, release};
pub use validation::{ValidateAll, validate_all};
