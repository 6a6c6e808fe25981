//! # stackless
//!
//! Stack-safe deferred computations for Rust.
//!
//! ## Overview
//!
//! A computation is described first and run later. Descriptions are immutable
//! graphs of leaves and binds; running one walks the graph with an explicit
//! continuation stack instead of native recursion, so arbitrarily long
//! `flat_map` chains and infinite `forever` loops never overflow the stack.
//!
//! - **Type Classes**: [`Semigroup`](typeclass::Semigroup) and
//!   [`Monoid`](typeclass::Monoid) for combining errors
//! - **Control Structures**: [`Outcome`](control::Outcome) with fail-fast and
//!   accumulating validation
//! - **Effect System**: [`IO`](effect::IO) and [`AsyncIO`](effect::AsyncIO)
//!   with a trampolined interpreter
//! - **Codecs**: [`Codec`](codec::Codec) between JSON values and typed data
//!
//! ## Feature Flags
//!
//! - `typeclass`: Semigroup, Monoid
//! - `control`: Outcome and validation
//! - `effect`: IO and the interpreter
//! - `async`: `AsyncIO` on top of tokio
//! - `codec`: JSON codecs
//! - `serde`: Serialize/Deserialize for `Outcome` and `RunOptions`
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use stackless::prelude::*;
//!
//! let countdown = (0..100_000).fold(IO::of(0_u64), |io, _| io.flat_map(|n| IO::of(n + 1)));
//! assert_eq!(countdown.run(), 100_000);
//!
//! let checked = (Outcome::<String, i32>::failure("a".into()), Outcome::<String, i32>::failure("b".into()))
//!     .validate_all(separated_by(" | "));
//! assert_eq!(checked, Outcome::failure("a | b".to_string()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use stackless::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "typeclass")]
    pub use crate::typeclass::*;

    #[cfg(feature = "control")]
    pub use crate::control::*;

    #[cfg(feature = "effect")]
    pub use crate::effect::*;

    #[cfg(feature = "codec")]
    pub use crate::codec::*;
}

#[cfg(feature = "typeclass")]
pub mod typeclass;

#[cfg(feature = "control")]
pub mod control;

#[cfg(feature = "effect")]
pub mod effect;

#[cfg(feature = "codec")]
pub mod codec;
