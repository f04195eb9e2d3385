//! Core types for settled outcomes.
//!
//! - [`Disposition`]: fulfilled-or-rejected tag
//! - [`Settlement`]: a disposition together with its value

pub mod settlement;

pub use settlement::{Disposition, Settlement};
