//! Common utilities for promise integration tests.

#![allow(dead_code, unused_macros)]

use parking_lot::Mutex;
use pledge::{Promise, PromiseError, Resolution, Settlement};
use std::sync::Arc;

pub use pledge::test_utils::init_test_logging;

/// Slot filled with a promise's settlement once it is observed.
pub type Outcome<T> = Arc<Mutex<Option<Settlement<T, PromiseError>>>>;

macro_rules! test_phase {
    ($name:expr) => {
        pledge::test_phase!($name)
    };
}

macro_rules! test_section {
    ($name:expr) => {
        pledge::test_section!($name)
    };
}

macro_rules! test_complete {
    ($name:expr) => {
        pledge::test_complete!($name)
    };
}

/// Records the settlement of `promise` into the returned slot.
pub fn record<T>(promise: &Promise<T>) -> Outcome<T>
where
    T: Clone + Send + 'static,
{
    let outcome: Outcome<T> = Arc::new(Mutex::new(None));
    let on_value = Arc::clone(&outcome);
    let on_reason = Arc::clone(&outcome);
    promise.then_with(
        Box::new(move |value: T| {
            *on_value.lock() = Some(Settlement::Fulfilled(value.clone()));
            Ok(Resolution::Value(value))
        }),
        Some(Box::new(move |reason: PromiseError| {
            *on_reason.lock() = Some(Settlement::Rejected(reason.clone()));
            Err(reason)
        })),
    );
    outcome
}

/// Reads the recorded settlement.
pub fn settled<T: Clone>(outcome: &Outcome<T>) -> Option<Settlement<T, PromiseError>> {
    outcome.lock().clone()
}
