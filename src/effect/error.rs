//! Error types for the effect system.
//!
//! The interpreters themselves never fail: a producer that panics unwinds
//! straight through [`IO::run`](super::IO::run). The errors below are only
//! produced by the checked entry points, [`IO::run_with`](super::IO::run_with)
//! and [`IO::try_run`](super::IO::try_run), which turn a bounded run or a
//! captured panic into a value.

use std::any::Any;

use thiserror::Error;

use super::RunStats;

/// Represents errors reported by the checked interpreter entry points.
///
/// # Examples
///
/// ```rust
/// use stackless::effect::{EffectError, IO, RunOptions};
///
/// let ticking = IO::from_thunk(|| ()).forever();
/// let error = ticking
///     .run_with(&RunOptions::default().with_step_limit(100))
///     .unwrap_err();
/// assert!(matches!(error, EffectError::StepLimitExceeded { limit: 100, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EffectError {
    /// The interpreter visited more nodes than the configured limit allows.
    #[error("interpretation stopped after {limit} steps (peak stack depth {})", .stats.peak_stack_depth)]
    StepLimitExceeded {
        /// The configured limit.
        limit: u64,
        /// Counters at the moment the run was abandoned.
        stats: RunStats,
    },

    /// A producer or continuation panicked while the graph was interpreted.
    #[error("effect panicked: {message}")]
    Panicked {
        /// The panic payload rendered as text.
        message: String,
    },
}

impl EffectError {
    /// Builds a [`EffectError::Panicked`] from a payload returned by
    /// `std::panic::catch_unwind`.
    pub(crate) fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "Unknown panic".to_string()
        };
        Self::Panicked { message }
    }
}
