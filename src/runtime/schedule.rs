//! The scheduling capability consumed by promises.

use std::sync::Arc;

/// A unit of deferred work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs at some later point, in FIFO order.
///
/// Implementations must never run a job inside the `schedule` call itself,
/// and jobs submitted by one caller must run in the order they were
/// submitted. Latency is unspecified.
pub trait Schedule: Send + Sync {
    /// Submits a job for later execution.
    fn schedule(&self, job: Job);
}

impl<S: Schedule + ?Sized> Schedule for Arc<S> {
    fn schedule(&self, job: Job) {
        (**self).schedule(job);
    }
}

impl<S: Schedule + ?Sized> Schedule for &S {
    fn schedule(&self, job: Job) {
        (**self).schedule(job);
    }
}
