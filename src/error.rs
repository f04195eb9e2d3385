//! Error types.
//!
//! [`PromiseError`] is the default rejection reason type. The engine itself
//! only ever produces [`PromiseError::SelfResolution`]; the other variants are
//! conveniences for callers that do not bring their own reason type.
//!
//! Any reason type used with the engine must implement
//! `From<PromiseError>` so that engine-detected failures can be delivered as
//! rejections.

use std::io;
use thiserror::Error;

/// Reasons a promise can be rejected with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum PromiseError {
    /// A deferred was resolved with its own promise view.
    #[error("cannot resolve a promise with itself")]
    SelfResolution,
    /// A fulfillment or rejection handler failed.
    #[error("handler failed: {0}")]
    Handler(String),
    /// Reading or invoking a thenable's `then` failed.
    #[error("thenable access failed: {0}")]
    ThenAccess(String),
    /// Rejected by the producer with a plain message.
    #[error("{0}")]
    Rejected(String),
}

impl PromiseError {
    /// Creates a [`PromiseError::Rejected`] from a message.
    #[must_use]
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Creates a [`PromiseError::Handler`] from a message.
    #[must_use]
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    /// Creates a [`PromiseError::ThenAccess`] from a message.
    #[must_use]
    pub fn then_access(msg: impl Into<String>) -> Self {
        Self::ThenAccess(msg.into())
    }

    /// Returns `true` if this is a self-resolution failure.
    #[must_use]
    pub const fn is_self_resolution(&self) -> bool {
        matches!(self, Self::SelfResolution)
    }
}

/// Errors raised while setting up a scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    /// The configuration could not be loaded.
    #[error("invalid scheduler config: {0}")]
    Config(String),
}
