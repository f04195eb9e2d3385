//! Optional tracing integration.
//!
//! With the `tracing-integration` feature enabled, the logging macros are
//! re-exported from [`tracing`](https://docs.rs/tracing). Without it they
//! expand to nothing, so call sites never need their own `cfg` guards.
//!
//! ```ignore
//! use crate::tracing_compat::{debug, trace};
//!
//! trace!(disposition = %settlement.disposition(), "queue settled");
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __pledge_log_noop {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing-integration"))]
pub use crate::__pledge_log_noop as debug;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__pledge_log_noop as error;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__pledge_log_noop as info;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__pledge_log_noop as trace;
#[cfg(not(feature = "tracing-integration"))]
pub use crate::__pledge_log_noop as warn;
