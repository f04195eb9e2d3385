//! Deferred/promise pair.
//!
//! A [`Deferred`] is the settle-once producer handle. Its [`Promise`] is the
//! read-only view consumers chain on. Both are cheap handles onto the same
//! moded queue and can be cloned freely; only `Deferred` can settle.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pledge::{Deferred, JobQueue, PromiseError, Resolution, deferred};
//!
//! let jobs = Arc::new(JobQueue::new());
//! let d: Deferred<i32> = deferred(&jobs);
//!
//! let recovered = d
//!     .promise()
//!     .and_then(|v| Ok(Resolution::Value(v * 10)))
//!     .catch(|_reason| Ok(Resolution::Value(-1)));
//!
//! d.reject(PromiseError::rejected("sensor offline"));
//! jobs.run_until_idle();
//! # let _ = recovered;
//! ```

use crate::error::PromiseError;
use crate::promise::queue::{ModedQueue, Reaction};
use crate::promise::resolution::{IntoResolution, Resolution, resolve_into};
use crate::runtime::schedule::Schedule;
use crate::tracing_compat::debug;
use crate::types::Settlement;
use std::fmt;
use std::sync::Arc;

/// What a handler produces: a resolution for the derived promise, or a
/// reason to reject it with.
pub type HandlerResult<T, E> = Result<Resolution<T, E>, E>;

/// A boxed fulfillment or rejection handler taking an `A`.
pub type Handler<A, T, E> = Box<dyn FnOnce(A) -> HandlerResult<T, E> + Send + 'static>;

/// Creates a pending deferred whose reactions run on `scheduler`.
pub fn deferred<T, E, S>(scheduler: &Arc<S>) -> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
    S: Schedule + 'static,
{
    let scheduler: Arc<dyn Schedule> = scheduler.clone();
    Deferred::new(scheduler)
}

/// The producer half: settles the eventual value exactly once.
pub struct Deferred<T, E = PromiseError> {
    queue: Arc<ModedQueue<T, E>>,
}

/// The consumer half: a read-only view for registering reactions.
pub struct Promise<T, E = PromiseError> {
    queue: Arc<ModedQueue<T, E>>,
}

impl<T, E> Deferred<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    /// Creates a pending deferred.
    #[must_use]
    pub fn new(scheduler: Arc<dyn Schedule>) -> Self {
        Self {
            queue: Arc::new(ModedQueue::new(scheduler)),
        }
    }

    /// Returns the promise view of this deferred.
    #[must_use]
    pub fn promise(&self) -> Promise<T, E> {
        Promise {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Resolves with a plain value.
    ///
    /// Has no effect if the deferred already settled.
    pub fn resolve(&self, value: T) {
        resolve_into(self, Resolution::Value(value));
    }

    /// Resolves with a value that may be a promise or thenable, adopting its
    /// eventual outcome.
    ///
    /// If classifying the value fails, the deferred is rejected with the
    /// failure instead.
    pub fn resolve_with(&self, value: impl IntoResolution<T, E>) {
        match value.into_resolution() {
            Ok(resolution) => resolve_into(self, resolution),
            Err(reason) => {
                debug!("resolution value could not be classified");
                self.reject(reason);
            }
        }
    }

    /// Rejects with `reason`, as-is.
    ///
    /// Has no effect if the deferred already settled.
    pub fn reject(&self, reason: E) {
        self.queue.settle(Settlement::Rejected(reason));
    }

    pub(crate) fn fulfill(&self, value: T) {
        self.queue.settle(Settlement::Fulfilled(value));
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    /// Registers fulfillment and rejection handlers.
    ///
    /// Returns a promise for the handler's result. A handler's `Err` rejects
    /// it; an `Ok` resolution is adopted into it. An omitted handler passes
    /// the original value or reason through unchanged.
    pub fn then(
        &self,
        on_fulfilled: Option<Handler<T, T, E>>,
        on_rejected: Option<Handler<E, T, E>>,
    ) -> Self {
        self.react(
            move |value, derived: &Deferred<T, E>| match on_fulfilled {
                Some(handler) => run_handler(derived, handler, value),
                None => derived.resolve(value),
            },
            move |reason, derived: &Deferred<T, E>| match on_rejected {
                Some(handler) => run_handler(derived, handler, reason),
                None => derived.reject(reason),
            },
        )
    }

    /// Like [`then`](Self::then), with a fulfillment handler that changes the
    /// value type. Rejections pass through when `on_rejected` is omitted.
    pub fn then_with<U>(
        &self,
        on_fulfilled: Handler<T, U, E>,
        on_rejected: Option<Handler<E, U, E>>,
    ) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
    {
        self.react(
            move |value, derived: &Deferred<U, E>| run_handler(derived, on_fulfilled, value),
            move |reason, derived: &Deferred<U, E>| match on_rejected {
                Some(handler) => run_handler(derived, handler, reason),
                None => derived.reject(reason),
            },
        )
    }

    /// Registers only a fulfillment handler.
    pub fn and_then<F>(&self, on_fulfilled: F) -> Self
    where
        F: FnOnce(T) -> HandlerResult<T, E> + Send + 'static,
    {
        self.then(Some(Box::new(on_fulfilled)), None)
    }

    /// Registers only a rejection handler.
    pub fn catch<F>(&self, on_rejected: F) -> Self
    where
        F: FnOnce(E) -> HandlerResult<T, E> + Send + 'static,
    {
        self.then(None, Some(Box::new(on_rejected)))
    }

    /// Maps the fulfillment value with an infallible function.
    pub fn map<U, F>(&self, f: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.then_with(Box::new(move |value| Ok(Resolution::Value(f(value)))), None)
    }

    /// Registers raw reactions without deriving a new promise.
    pub(crate) fn subscribe<F, R>(&self, on_fulfilled: F, on_rejected: R)
    where
        F: FnOnce(T) + Send + 'static,
        R: FnOnce(E) + Send + 'static,
    {
        self.queue.push(Reaction::Fulfilled(Box::new(on_fulfilled)));
        self.queue.push(Reaction::Rejected(Box::new(on_rejected)));
    }

    /// Returns true if this promise is the view of `deferred`.
    pub(crate) fn is_view_of(&self, deferred: &Deferred<T, E>) -> bool {
        Arc::ptr_eq(&self.queue, &deferred.queue)
    }

    fn react<U, F, R>(&self, on_fulfilled: F, on_rejected: R) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T, &Deferred<U, E>) + Send + 'static,
        R: FnOnce(E, &Deferred<U, E>) + Send + 'static,
    {
        let derived = Deferred::new(Arc::clone(self.queue.scheduler()));
        let fulfill_target = derived.clone();
        let reject_target = derived.clone();
        self.subscribe(
            move |value| on_fulfilled(value, &fulfill_target),
            move |reason| on_rejected(reason, &reject_target),
        );
        derived.promise()
    }
}

/// Runs a handler and routes its outcome into `derived`.
fn run_handler<A, U, E>(derived: &Deferred<U, E>, handler: Handler<A, U, E>, arg: A)
where
    U: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    match handler(arg) {
        Ok(resolution) => resolve_into(derived, resolution),
        Err(reason) => {
            debug!("handler failed; rejecting derived promise");
            derived.reject(reason);
        }
    }
}

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("queue", &self.queue)
            .finish()
    }
}

impl<T, E> fmt::Debug for Promise<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("queue", &self.queue)
            .finish()
    }
}
