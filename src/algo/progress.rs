//! Progress reporting and cancellation for long-running algorithms.
//!
//! This module provides a simple progress callback mechanism that
//! algorithms can use to report their progress to callers, plus a
//! cooperative cancellation token polled by the unfolding drivers.
//!
//! # Example
//!
//! ```
//! use unfurl::algo::progress::{CancelToken, Progress};
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let cancel = CancelToken::new();
//! let handle = cancel.clone();
//! // handle.cancel() from another thread abandons the run.
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A progress callback that receives updates during long-running operations.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current operation
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}

/// A cooperative cancellation token.
///
/// Cloning the token produces a handle to the same flag, so one side can
/// request cancellation while an algorithm polls [`is_cancelled`] between
/// growth passes. Cancellation is cooperative: in-flight work finishes its
/// current step and the operation surfaces as
/// [`UnfoldError::Cancelled`](crate::error::UnfoldError::Cancelled) with no
/// partial result.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, non-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_reports() {
        use std::sync::atomic::AtomicUsize;

        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let progress = Progress::new(move |current, total, _| {
            assert!(current <= total);
            seen.fetch_add(1, Ordering::Relaxed);
        });

        progress.report(0, 4, "start");
        progress.report(4, 4, "done");
        assert_eq!(count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let handle = token.clone();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
    }
}
