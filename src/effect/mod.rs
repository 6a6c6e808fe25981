//! Effect system for deferred, stack-safe side effects.
//!
//! # IO
//!
//! The [`IO`] type describes a synchronous computation as an immutable graph.
//! Side effects are deferred until [`IO::run`] interprets the graph with a
//! trampolined loop, so chains of any length run in constant native stack.
//!
//! ```rust
//! use stackless::effect::IO;
//!
//! // Create and chain IO actions
//! let io = IO::of(10)
//!     .map(|x| x * 2)
//!     .flat_map(|x| IO::of(x + 1));
//!
//! // Side effects don't occur until run is called
//! assert_eq!(io.run(), 21);
//! ```
//!
//! # Bounded Runs
//!
//! [`IO::run_with`] applies [`RunOptions`] and reports [`RunStats`]; a step
//! limit turns a non-terminating graph into an [`EffectError`].
//!
//! # AsyncIO
//!
//! [`AsyncIO`] (feature `async`) offers the same combinators for
//! asynchronous producers, plus `repeat` and `delay`, and is trampolined the
//! same way.

// =============================================================================
// Errors
// =============================================================================

mod error;

pub use error::EffectError;

// =============================================================================
// IO Graph and Interpreter
// =============================================================================

mod interpreter;
mod io;

pub use interpreter::{Completed, RunOptions, RunStats};
pub use io::IO;

// =============================================================================
// AsyncIO (requires async feature)
// =============================================================================

#[cfg(feature = "async")]
mod async_io;

#[cfg(feature = "async")]
pub use async_io::AsyncIO;
