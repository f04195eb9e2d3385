//! Moded queue.
//!
//! Buffers reactions while pending. The first settlement locks in the mode
//! (disposition) and value, schedules every buffered reaction of that mode in
//! registration order and drops the rest. After that the buffer is gone:
//! a new reaction of the settled mode is scheduled straight away, any other
//! is dropped.
//!
//! Scheduling happens while the state lock is held, so a reaction pushed
//! concurrently with settlement can never be scheduled ahead of the
//! reactions that were buffered before it.

use crate::runtime::schedule::{Job, Schedule};
use crate::tracing_compat::trace;
#[cfg(test)]
use crate::types::Disposition;
use crate::types::Settlement;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A registered reaction: a disposition filter and its callback.
pub(crate) enum Reaction<T, E> {
    Fulfilled(Box<dyn FnOnce(T) + Send + 'static>),
    Rejected(Box<dyn FnOnce(E) + Send + 'static>),
}

#[cfg(test)]
impl<T, E> Reaction<T, E> {
    pub(crate) const fn filter(&self) -> Disposition {
        match self {
            Self::Fulfilled(_) => Disposition::Fulfilled,
            Self::Rejected(_) => Disposition::Rejected,
        }
    }
}

enum QueueState<T, E> {
    Pending(Vec<Reaction<T, E>>),
    Settled(Settlement<T, E>),
}

pub(crate) struct ModedQueue<T, E> {
    state: Mutex<QueueState<T, E>>,
    scheduler: Arc<dyn Schedule>,
}

impl<T, E> ModedQueue<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new(scheduler: Arc<dyn Schedule>) -> Self {
        Self {
            state: Mutex::new(QueueState::Pending(Vec::new())),
            scheduler,
        }
    }

    pub(crate) fn scheduler(&self) -> &Arc<dyn Schedule> {
        &self.scheduler
    }

    /// Registers a reaction.
    pub(crate) fn push(&self, reaction: Reaction<T, E>) {
        let mut state = self.state.lock();
        match &mut *state {
            QueueState::Pending(buffer) => buffer.push(reaction),
            QueueState::Settled(settlement) => {
                if let Some(job) = bind(reaction, settlement) {
                    self.scheduler.schedule(job);
                }
            }
        }
    }

    /// Settles the queue. Returns false if it was already settled.
    pub(crate) fn settle(&self, settlement: Settlement<T, E>) -> bool {
        let mut state = self.state.lock();
        let QueueState::Pending(buffer) = &mut *state else {
            trace!(
                disposition = %settlement.disposition(),
                "ignoring settlement of an already settled queue"
            );
            return false;
        };
        let jobs: Vec<Job> = std::mem::take(buffer)
            .into_iter()
            .filter_map(|reaction| bind(reaction, &settlement))
            .collect();
        trace!(
            disposition = %settlement.disposition(),
            dispatched = jobs.len(),
            "queue settled"
        );
        for job in jobs {
            self.scheduler.schedule(job);
        }
        *state = QueueState::Settled(settlement);
        true
    }

    /// Returns the settled disposition, if any.
    #[cfg(test)]
    pub(crate) fn disposition(&self) -> Option<Disposition> {
        match &*self.state.lock() {
            QueueState::Pending(_) => None,
            QueueState::Settled(settlement) => Some(settlement.disposition()),
        }
    }
}

/// Pairs a reaction with the settled value if its filter matches.
fn bind<T, E>(reaction: Reaction<T, E>, settlement: &Settlement<T, E>) -> Option<Job>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    match (reaction, settlement) {
        (Reaction::Fulfilled(callback), Settlement::Fulfilled(value)) => {
            let value = value.clone();
            Some(Box::new(move || callback(value)))
        }
        (Reaction::Rejected(callback), Settlement::Rejected(reason)) => {
            let reason = reason.clone();
            Some(Box::new(move || callback(reason)))
        }
        _ => None,
    }
}

impl<T, E> fmt::Debug for ModedQueue<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ModedQueue");
        match &*self.state.lock() {
            QueueState::Pending(buffer) => s.field("pending", &buffer.len()),
            QueueState::Settled(settlement) => s.field("settled", &settlement.disposition()),
        };
        s.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::JobQueue;

    type Log = Arc<Mutex<Vec<String>>>;

    fn init_test(name: &str) {
        crate::test_utils::init_test_logging();
        crate::test_phase!(name);
    }

    fn setup() -> (Arc<JobQueue>, ModedQueue<i32, String>, Log) {
        let jobs = Arc::new(JobQueue::new());
        let scheduler: Arc<dyn Schedule> = jobs.clone();
        (jobs, ModedQueue::new(scheduler), Arc::new(Mutex::new(Vec::new())))
    }

    fn on_fulfilled(log: &Log, tag: &'static str) -> Reaction<i32, String> {
        let log = Arc::clone(log);
        Reaction::Fulfilled(Box::new(move |v| log.lock().push(format!("{tag}:{v}"))))
    }

    fn on_rejected(log: &Log, tag: &'static str) -> Reaction<i32, String> {
        let log = Arc::clone(log);
        Reaction::Rejected(Box::new(move |e| log.lock().push(format!("{tag}:{e}"))))
    }

    #[test]
    fn buffered_reactions_fire_in_order_after_settle() {
        init_test("buffered_reactions_fire_in_order_after_settle");
        let (jobs, queue, log) = setup();

        queue.push(on_fulfilled(&log, "a"));
        queue.push(on_rejected(&log, "r"));
        queue.push(on_fulfilled(&log, "b"));
        assert!(jobs.is_empty());

        assert!(queue.settle(Settlement::Fulfilled(7)));
        crate::assert_with_log!(jobs.len() == 2, "matching reactions scheduled", 2, jobs.len());
        crate::assert_with_log!(log.lock().is_empty(), "nothing inline", 0, log.lock().len());

        jobs.run_until_idle();
        assert_eq!(*log.lock(), vec!["a:7".to_string(), "b:7".to_string()]);
        crate::test_complete!("buffered_reactions_fire_in_order_after_settle");
    }

    #[test]
    fn first_settlement_wins() {
        init_test("first_settlement_wins");
        let (jobs, queue, log) = setup();

        assert!(queue.settle(Settlement::Rejected("no".into())));
        assert!(!queue.settle(Settlement::Fulfilled(1)));
        assert!(!queue.settle(Settlement::Rejected("again".into())));
        assert_eq!(queue.disposition(), Some(Disposition::Rejected));

        queue.push(on_rejected(&log, "late"));
        queue.push(on_fulfilled(&log, "never"));
        jobs.run_until_idle();
        assert_eq!(*log.lock(), vec!["late:no".to_string()]);
        crate::test_complete!("first_settlement_wins");
    }

    #[test]
    fn late_reactions_run_after_buffered_ones() {
        init_test("late_reactions_run_after_buffered_ones");
        let (jobs, queue, log) = setup();

        queue.push(on_fulfilled(&log, "early"));
        queue.settle(Settlement::Fulfilled(3));
        queue.push(on_fulfilled(&log, "late1"));
        queue.push(on_fulfilled(&log, "late2"));
        assert!(log.lock().is_empty());

        jobs.run_until_idle();
        assert_eq!(
            *log.lock(),
            vec![
                "early:3".to_string(),
                "late1:3".to_string(),
                "late2:3".to_string()
            ]
        );
        crate::test_complete!("late_reactions_run_after_buffered_ones");
    }

    #[test]
    fn reaction_filter_and_debug() {
        let (_jobs, queue, log) = setup();
        assert_eq!(on_fulfilled(&log, "x").filter(), Disposition::Fulfilled);
        assert_eq!(on_rejected(&log, "x").filter(), Disposition::Rejected);

        assert_eq!(queue.disposition(), None);
        assert!(format!("{queue:?}").contains("pending"));
        queue.settle(Settlement::Fulfilled(0));
        assert!(format!("{queue:?}").contains("settled"));
    }
}
