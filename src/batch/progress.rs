//! Progress notification and cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives progress notifications from the batch driver
///
/// Called concurrently from worker threads; `done` counts finished trees in
/// completion order, not input order.
pub trait ProgressReporter: Send + Sync {
    /// Batch of `total` trees is about to start
    fn on_start(&self, _total: usize) {}

    /// Another tree finished encoding
    fn on_tree(&self, done: usize, total: usize);

    /// All trees finished successfully
    fn on_finish(&self, _total: usize) {}
}

/// Reporter that ignores every notification
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn on_tree(&self, _done: usize, _total: usize) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_tree(&self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Shared flag that stops a running batch from dispatching more trees
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!flag.is_cancelled());
        clone.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn test_closure_reporter() {
        let calls = AtomicUsize::new(0);
        let reporter = |done: usize, total: usize| {
            assert!(done <= total);
            calls.fetch_add(1, Ordering::Relaxed);
        };
        reporter.on_start(2);
        reporter.on_tree(1, 2);
        reporter.on_tree(2, 2);
        reporter.on_finish(2);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }
}
