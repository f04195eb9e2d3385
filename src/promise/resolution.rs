//! Thenable resolution.
//!
//! A value a deferred is resolved with is classified once, at the boundary,
//! into a [`Resolution`]: a plain value, a native [`Promise`], or a foreign
//! [`Thenable`]. Plain values fulfill the target directly. Promises and
//! thenables are adopted: the target settles however they eventually settle,
//! unwrapping nested thenables until a plain value comes out.
//!
//! # Guards
//!
//! - Resolving a deferred with its own promise rejects it with
//!   [`PromiseError::SelfResolution`].
//! - The callbacks handed to a thenable share a latch. Only the first call to
//!   any of them has an effect, and a failure returned from `then` after the
//!   latch fired is ignored.

use crate::error::PromiseError;
use crate::promise::deferred::{Deferred, Promise};
use crate::tracing_compat::{debug, trace};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A foreign promise-like value.
///
/// `then` receives the resolving callbacks for the deferred being resolved.
/// It may call them right away, later from any thread, or never. Returning
/// `Err` reports that invoking `then` itself failed.
pub trait Thenable<T, E>: Send {
    /// Registers the resolving callbacks with this thenable.
    fn then(self: Box<Self>, resolvers: ResolvingFunctions<T, E>) -> Result<(), E>;
}

struct ThenFn<F>(F);

impl<T, E, F> Thenable<T, E> for ThenFn<F>
where
    F: FnOnce(ResolvingFunctions<T, E>) -> Result<(), E> + Send,
{
    fn then(self: Box<Self>, resolvers: ResolvingFunctions<T, E>) -> Result<(), E> {
        (self.0)(resolvers)
    }
}

/// A value a deferred is being resolved with.
pub enum Resolution<T, E> {
    /// A plain value; fulfills immediately.
    Value(T),
    /// A native promise whose outcome is adopted.
    Promise(Promise<T, E>),
    /// A foreign thenable whose outcome is adopted.
    Thenable(Box<dyn Thenable<T, E>>),
}

impl<T, E> Resolution<T, E> {
    /// Wraps a thenable.
    pub fn thenable(thenable: impl Thenable<T, E> + 'static) -> Self {
        Self::Thenable(Box::new(thenable))
    }

    /// Wraps a closure acting as a thenable's `then`.
    pub fn from_then<F>(then: F) -> Self
    where
        F: FnOnce(ResolvingFunctions<T, E>) -> Result<(), E> + Send + 'static,
        T: 'static,
        E: 'static,
    {
        Self::Thenable(Box::new(ThenFn(then)))
    }

    /// Returns true for a plain value.
    #[must_use]
    pub const fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}

impl<T: fmt::Debug, E> fmt::Debug for Resolution<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Promise(_) => f.write_str("Promise(..)"),
            Self::Thenable(_) => f.write_str("Thenable(..)"),
        }
    }
}

/// Conversion of a foreign value into a [`Resolution`].
///
/// This is where a value's shape is inspected. An `Err` means inspecting it
/// failed (for example, reading its `then` member raised), and the deferred
/// is rejected with that reason.
pub trait IntoResolution<T, E> {
    /// Classifies the value.
    fn into_resolution(self) -> Result<Resolution<T, E>, E>;
}

impl<T, E> IntoResolution<T, E> for Resolution<T, E> {
    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        Ok(self)
    }
}

impl<T, E> IntoResolution<T, E> for Promise<T, E> {
    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        Ok(Resolution::Promise(self))
    }
}

impl<T, E> IntoResolution<T, E> for Result<Resolution<T, E>, E> {
    fn into_resolution(self) -> Result<Resolution<T, E>, E> {
        self
    }
}

/// The latch-guarded callbacks handed to a thenable.
///
/// Clones share one latch: whichever of [`fulfill`](Self::fulfill),
/// [`resolve`](Self::resolve) or [`reject`](Self::reject) is called first
/// takes effect, and every later call on any clone is ignored.
pub struct ResolvingFunctions<T, E> {
    target: Deferred<T, E>,
    latch: Arc<AtomicBool>,
}

impl<T, E> Clone for ResolvingFunctions<T, E> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            latch: Arc::clone(&self.latch),
        }
    }
}

impl<T, E> ResolvingFunctions<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    pub(crate) fn new(target: Deferred<T, E>) -> Self {
        Self {
            target,
            latch: Arc::new(AtomicBool::new(false)),
        }
    }

    fn claim(&self) -> bool {
        !self.latch.swap(true, Ordering::AcqRel)
    }

    /// Fulfills with a plain value.
    pub fn fulfill(&self, value: T) {
        self.resolve(Resolution::Value(value));
    }

    /// Resolves with a value that may itself be a promise or thenable.
    pub fn resolve(&self, resolution: Resolution<T, E>) {
        if self.claim() {
            resolve_into(&self.target, resolution);
        } else {
            trace!("thenable resolved after its latch fired; ignored");
        }
    }

    /// Rejects with a reason.
    pub fn reject(&self, reason: E) {
        if self.claim() {
            self.target.reject(reason);
        } else {
            trace!("thenable rejected after its latch fired; ignored");
        }
    }

    /// Returns true once any callback has been called.
    #[must_use]
    pub fn is_spent(&self) -> bool {
        self.latch.load(Ordering::Acquire)
    }
}

impl<T, E> fmt::Debug for ResolvingFunctions<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvingFunctions")
            .field("spent", &self.latch.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

/// Settles `target` according to `resolution`, adopting promises and thenables.
pub(crate) fn resolve_into<T, E>(target: &Deferred<T, E>, resolution: Resolution<T, E>)
where
    T: Clone + Send + 'static,
    E: Clone + Send + From<PromiseError> + 'static,
{
    match resolution {
        Resolution::Value(value) => target.fulfill(value),
        Resolution::Promise(promise) => {
            if promise.is_view_of(target) {
                debug!("deferred resolved with its own promise");
                target.reject(E::from(PromiseError::SelfResolution));
                return;
            }
            let resolvers = ResolvingFunctions::new(target.clone());
            let on_reject = resolvers.clone();
            promise.subscribe(
                move |value| resolvers.fulfill(value),
                move |reason| on_reject.reject(reason),
            );
        }
        Resolution::Thenable(thenable) => {
            let resolvers = ResolvingFunctions::new(target.clone());
            if let Err(reason) = thenable.then(resolvers.clone()) {
                debug!(spent = resolvers.is_spent(), "thenable `then` failed");
                resolvers.reject(reason);
            }
        }
    }
}
