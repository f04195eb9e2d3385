//! Pledge: a deferred/promise engine with thenable adoption.
//!
//! # Overview
//!
//! A [`Deferred`] is the producer half of an eventual value: whoever holds it
//! decides, exactly once, whether the value is fulfilled or rejected. Its
//! [`Promise`] view is handed to consumers, who register reactions with
//! [`Promise::then`] and receive a fresh promise for the reaction's result.
//!
//! # Core Guarantees
//!
//! - **Write-once settlement**: the first `resolve`/`reject` that reaches the
//!   queue wins; every later call is a no-op
//! - **Never synchronous**: every reaction runs through the injected
//!   [`Schedule`] implementation, never inside the call that registered or
//!   settled it
//! - **Registration order**: reactions of the same disposition fire in the
//!   order they were registered
//! - **Thenable adoption**: resolving with a promise-like value adopts its
//!   eventual outcome, through any number of nesting levels, with
//!   self-resolution and double-call protection
//! - **No escaping failures**: handler and thenable failures become
//!   rejections of the nearest deferred
//!
//! # Module Structure
//!
//! - [`types`]: Dispositions and settlements
//! - [`error`](mod@error): Error types
//! - [`runtime`]: Deferred-execution primitives (job queue, worker thread)
//! - [`promise`]: Moded queue, resolution procedure, deferred/promise pair
//! - [`tracing_compat`]: Optional tracing integration (requires `tracing-integration` feature)
//!
//! # Example
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use pledge::{Deferred, JobQueue, deferred};
//!
//! let queue = Arc::new(JobQueue::new());
//! let d: Deferred<i32> = deferred(&queue);
//!
//! let seen = Arc::new(Mutex::new(None));
//! let sink = Arc::clone(&seen);
//! d.promise()
//!     .map(|v| v + 1)
//!     .map(move |v| *sink.lock().unwrap() = Some(v));
//!
//! d.resolve(1);
//! assert_eq!(*seen.lock().unwrap(), None);
//!
//! queue.run_until_idle();
//! assert_eq!(*seen.lock().unwrap(), Some(2));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod error;
pub mod promise;
pub mod runtime;
pub mod tracing_compat;
pub mod types;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use error::{PromiseError, SchedulerError};
pub use promise::{
    Deferred, Handler, HandlerResult, IntoResolution, Promise, Resolution, ResolvingFunctions,
    Thenable, deferred,
};
pub use runtime::{Job, JobQueue, Schedule, WorkerConfig, WorkerScheduler};
pub use types::{Disposition, Settlement};
