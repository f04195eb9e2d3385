//! Cooperative job queue.
//!
//! A thread-safe unbounded FIFO of jobs that is drained explicitly by its
//! owner, one job at a time. This is the single-threaded event-loop
//! realization of [`Schedule`]: nothing runs until the owner calls
//! [`run_one`](JobQueue::run_one) or [`run_until_idle`](JobQueue::run_until_idle).

use crate::runtime::schedule::{Job, Schedule};
use crossbeam_queue::SegQueue;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A cooperative FIFO job queue.
#[derive(Default)]
pub struct JobQueue {
    inner: SegQueue<Job>,
    executed: AtomicU64,
}

impl JobQueue {
    /// Creates a new empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SegQueue::new(),
            executed: AtomicU64::new(0),
        }
    }

    /// Pushes a job to the back of the queue.
    pub fn push(&self, job: Job) {
        self.inner.push(job);
    }

    /// Runs the job at the front of the queue.
    ///
    /// Returns false if the queue was empty.
    pub fn run_one(&self) -> bool {
        let Some(job) = self.inner.pop() else {
            return false;
        };
        job();
        self.executed.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Runs at most `budget` jobs, returning how many ran.
    pub fn run_budget(&self, budget: usize) -> usize {
        let mut ran = 0;
        while ran < budget && self.run_one() {
            ran += 1;
        }
        ran
    }

    /// Runs jobs until the queue is empty, including jobs pushed by jobs.
    ///
    /// Returns how many jobs ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }

    /// Returns the number of queued jobs.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if no jobs are queued.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the total number of jobs run so far.
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }
}

impl Schedule for JobQueue {
    fn schedule(&self, job: Job) {
        self.push(job);
    }
}

impl fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue")
            .field("len", &self.len())
            .field("executed", &self.executed())
            .finish()
    }
}
