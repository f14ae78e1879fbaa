//! Unfolding algorithms and run-control utilities.
//!
//! - [`flatten`]: the unfolding engine: sheet construction, greedy and
//!   strip-shaped growth drivers, and the pluggable policy traits.
//! - [`progress`]: progress reporting and cooperative cancellation for
//!   long-running runs.

pub mod flatten;
pub mod progress;
