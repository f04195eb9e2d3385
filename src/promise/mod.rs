//! The deferred/promise engine.
//!
//! - `queue`: the moded queue that buffers reactions until settlement
//! - [`resolution`]: the procedure that adopts the outcome of thenables
//! - [`deferred`](mod@deferred): the producer/consumer pair built on both
//!
//! Reactions always run through the scheduler the deferred was created with,
//! and derived promises share that scheduler.

pub mod deferred;
pub(crate) mod queue;
pub mod resolution;

pub use deferred::{Deferred, Handler, HandlerResult, Promise, deferred};
pub use resolution::{IntoResolution, Resolution, ResolvingFunctions, Thenable};
