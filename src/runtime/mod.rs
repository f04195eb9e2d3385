//! Deferred-execution primitives.
//!
//! Promises never run reactions inline. Every reaction is handed to a
//! [`Schedule`] implementation, which runs it later in submission order.
//!
//! - [`JobQueue`]: cooperative single-consumer queue, drained by the caller
//! - [`WorkerScheduler`]: dedicated worker thread draining a FIFO queue
//! - [`WorkerConfig`]: worker thread settings

pub mod config;
pub mod schedule;
pub mod scheduler;

pub use config::WorkerConfig;
pub use schedule::{Job, Schedule};
pub use scheduler::{JobQueue, WorkerScheduler};
