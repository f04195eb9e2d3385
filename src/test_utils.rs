//! Test helpers: logging bootstrap and phase markers.
//!
//! Only compiled for unit tests or with the `test-internals` feature.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

#[doc(hidden)]
pub use tracing;

static INIT_LOGGING: Once = Once::new();

/// Installs a test-friendly `tracing` subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `pledge=trace`.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pledge=trace"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Marks the start of a test.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        $crate::test_utils::tracing::info!(phase = %$name, "==== test phase ====")
    };
}

/// Marks a section inside a test.
#[macro_export]
macro_rules! test_section {
    ($name:expr) => {
        $crate::test_utils::tracing::info!(section = %$name, "---- section ----")
    };
}

/// Marks the successful end of a test.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        $crate::test_utils::tracing::info!(test = %$name, "==== test complete ====")
    };
}

/// Asserts a condition, logging expected and actual values either way.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {{
        let ok = $cond;
        let expected = &$expected;
        let actual = &$actual;
        if ok {
            $crate::test_utils::tracing::debug!(?expected, ?actual, "{}", $msg);
        } else {
            $crate::test_utils::tracing::error!(?expected, ?actual, "assertion failed: {}", $msg);
        }
        assert!(ok, "{}: expected {:?}, got {:?}", $msg, expected, actual);
    }};
}
