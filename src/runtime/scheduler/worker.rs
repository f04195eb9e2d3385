//! Worker-thread scheduler.
//!
//! A single dedicated thread drains a FIFO queue of jobs. One consumer keeps
//! submission order intact, which is all the promise engine asks of a
//! scheduler.
//!
//! # Shutdown
//!
//! [`shutdown`](WorkerScheduler::shutdown) (and `Drop`) lets the worker drain
//! every job that was already submitted, then joins it. Jobs submitted after
//! shutdown are dropped without running. If the last handle is dropped on the
//! worker thread itself, the thread is detached instead of joined.
//!
//! # Panics in jobs
//!
//! A job that panics is caught and logged. It still counts as finished, and
//! the worker moves on to the next job.

use crate::error::SchedulerError;
use crate::runtime::config::WorkerConfig;
use crate::runtime::schedule::{Job, Schedule};
use crate::tracing_compat::{debug, trace, warn};
use crossbeam_queue::SegQueue;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

struct Shared {
    queue: SegQueue<Job>,
    /// Guards parking; the flag is the shutdown request.
    state: Mutex<bool>,
    work_ready: Condvar,
    idle: Condvar,
    /// Submitted but not yet finished.
    pending: AtomicUsize,
    executed: AtomicU64,
    closed: AtomicBool,
}

impl Shared {
    fn run_loop(&self) {
        loop {
            while let Some(job) = self.queue.pop() {
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                    report_panic(payload.as_ref());
                }
                self.executed.fetch_add(1, Ordering::Relaxed);
                if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let _guard = self.state.lock();
                    self.idle.notify_all();
                }
            }

            let mut shutdown = self.state.lock();
            if !self.queue.is_empty() {
                continue;
            }
            if *shutdown {
                break;
            }
            self.work_ready.wait(&mut shutdown);
        }
    }
}

#[cfg_attr(not(feature = "tracing-integration"), allow(unused_variables))]
fn report_panic(payload: &(dyn Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>");
    warn!(panic = message, "job panicked");
}

/// A scheduler backed by one worker thread.
pub struct WorkerScheduler {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_name: String,
}

impl WorkerScheduler {
    /// Starts a worker with the default configuration.
    pub fn new() -> Result<Self, SchedulerError> {
        Self::with_config(WorkerConfig::default())
    }

    /// Starts a worker with the given configuration.
    pub fn with_config(config: WorkerConfig) -> Result<Self, SchedulerError> {
        let shared = Arc::new(Shared {
            queue: SegQueue::new(),
            state: Mutex::new(false),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
            pending: AtomicUsize::new(0),
            executed: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        });

        let mut builder = thread::Builder::new().name(config.thread_name.clone());
        if let Some(bytes) = config.stack_size {
            builder = builder.stack_size(bytes);
        }
        let worker = Arc::clone(&shared);
        let handle = builder.spawn(move || worker.run_loop())?;
        debug!(thread = %config.thread_name, "worker scheduler started");

        Ok(Self {
            shared,
            handle: Mutex::new(Some(handle)),
            thread_name: config.thread_name,
        })
    }

    /// Returns the worker thread name.
    #[must_use]
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Returns the number of jobs submitted but not yet finished.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Returns the total number of jobs run so far.
    #[must_use]
    pub fn executed(&self) -> u64 {
        self.shared.executed.load(Ordering::Relaxed)
    }

    /// Returns true once shutdown has been requested.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Blocks until every submitted job has finished.
    ///
    /// Must not be called from a job running on this scheduler.
    pub fn wait_idle(&self) {
        self.assert_not_worker();
        let mut guard = self.shared.state.lock();
        while self.shared.pending.load(Ordering::Acquire) != 0 {
            self.shared.idle.wait(&mut guard);
        }
    }

    /// Blocks until every submitted job has finished or `timeout` elapses.
    ///
    /// Returns true if the scheduler went idle in time. A timeout too large
    /// to represent as a deadline waits without one.
    pub fn wait_idle_for(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_idle();
            return true;
        };
        self.assert_not_worker();
        let mut guard = self.shared.state.lock();
        while self.shared.pending.load(Ordering::Acquire) != 0 {
            if self
                .shared
                .idle
                .wait_until(&mut guard, deadline)
                .timed_out()
            {
                return self.shared.pending.load(Ordering::Acquire) == 0;
            }
        }
        true
    }

    /// Drains outstanding jobs, then stops and joins the worker thread.
    pub fn shutdown(&self) {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        {
            let mut shutdown = self.shared.state.lock();
            *shutdown = true;
            self.shared.work_ready.notify_all();
        }

        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            debug!(thread = %self.thread_name, "worker scheduler detached from its own thread");
            return;
        }
        if handle.join().is_err() {
            debug!(thread = %self.thread_name, "worker thread panicked");
        }
        debug!(thread = %self.thread_name, "worker scheduler stopped");
    }

    fn is_worker_thread(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|h| h.thread().id() == thread::current().id())
    }

    fn assert_not_worker(&self) {
        assert!(
            !self.is_worker_thread(),
            "cannot wait for the worker scheduler from its own thread"
        );
    }
}

impl Schedule for WorkerScheduler {
    fn schedule(&self, job: Job) {
        let shutdown = self.shared.state.lock();
        if *shutdown {
            drop(shutdown);
            trace!(thread = %self.thread_name, "job dropped after shutdown");
            return;
        }
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        self.shared.queue.push(job);
        self.shared.work_ready.notify_one();
    }
}

impl Drop for WorkerScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for WorkerScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerScheduler")
            .field("thread_name", &self.thread_name)
            .field("pending", &self.pending())
            .field("executed", &self.executed())
            .field("closed", &self.is_shut_down())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    #[test]
    fn runs_jobs_in_submission_order() {
        init_test("runs_jobs_in_submission_order");
        let scheduler = WorkerScheduler::new().expect("spawn worker");
        let log = Arc::new(Mutex::new(Vec::new()));

        for n in 0..100 {
            let log = Arc::clone(&log);
            scheduler.schedule(Box::new(move || log.lock().push(n)));
        }
        assert!(scheduler.wait_idle_for(Duration::from_secs(5)));

        let expected: Vec<i32> = (0..100).collect();
        crate::assert_with_log!(*log.lock() == expected, "fifo order", expected, *log.lock());
        assert_eq!(scheduler.executed(), 100);
        assert_eq!(scheduler.pending(), 0);
        crate::test_complete!("runs_jobs_in_submission_order");
    }

    #[test]
    fn jobs_run_on_named_worker_thread() {
        init_test("jobs_run_on_named_worker_thread");
        let config = WorkerConfig::default().thread_name("pledge-test-worker");
        let scheduler = WorkerScheduler::with_config(config).expect("spawn worker");
        let seen = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&seen);
        scheduler.schedule(Box::new(move || {
            *sink.lock() = thread::current().name().map(str::to_owned);
        }));
        scheduler.wait_idle();

        assert_eq!(seen.lock().as_deref(), Some("pledge-test-worker"));
        assert_eq!(scheduler.thread_name(), "pledge-test-worker");
        crate::test_complete!("jobs_run_on_named_worker_thread");
    }

    #[test]
    fn shutdown_drains_then_drops_late_jobs() {
        init_test("shutdown_drains_then_drops_late_jobs");
        let scheduler = WorkerScheduler::new().expect("spawn worker");
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            scheduler.schedule(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        scheduler.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert!(scheduler.is_shut_down());

        let late = Arc::clone(&counter);
        scheduler.schedule(Box::new(move || {
            late.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert_eq!(scheduler.pending(), 0);

        // Second shutdown is a no-op.
        scheduler.shutdown();
        crate::test_complete!("shutdown_drains_then_drops_late_jobs");
    }

    #[test]
    fn panicking_job_does_not_stop_the_worker() {
        init_test("panicking_job_does_not_stop_the_worker");
        let scheduler = WorkerScheduler::new().expect("spawn worker");
        let ran = Arc::new(AtomicBool::new(false));

        scheduler.schedule(Box::new(|| panic!("handler blew up")));
        let flag = Arc::clone(&ran);
        scheduler.schedule(Box::new(move || flag.store(true, Ordering::SeqCst)));

        let idle = scheduler.wait_idle_for(Duration::from_secs(5));
        crate::assert_with_log!(idle, "went idle after panic", true, idle);
        assert!(ran.load(Ordering::SeqCst));
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.executed(), 2);

        crate::test_section!("worker keeps accepting jobs");
        let again = Arc::clone(&ran);
        ran.store(false, Ordering::SeqCst);
        scheduler.schedule(Box::new(move || again.store(true, Ordering::SeqCst)));
        scheduler.wait_idle();
        assert!(ran.load(Ordering::SeqCst));
        crate::test_complete!("panicking_job_does_not_stop_the_worker");
    }

    #[test]
    fn wait_idle_for_unbounded_timeout() {
        init_test("wait_idle_for_unbounded_timeout");
        let scheduler = WorkerScheduler::new().expect("spawn worker");
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            scheduler.schedule(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert!(scheduler.wait_idle_for(Duration::MAX));
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        crate::test_complete!("wait_idle_for_unbounded_timeout");
    }

    #[test]
    fn wait_idle_for_on_empty_scheduler() {
        init_test("wait_idle_for_on_empty_scheduler");
        let scheduler = WorkerScheduler::new().expect("spawn worker");
        assert!(scheduler.wait_idle_for(Duration::from_millis(10)));
        let debug = format!("{scheduler:?}");
        assert!(debug.contains("WorkerScheduler"), "{debug}");
    }
}
