#![forbid(unsafe_code)]

//! Shared pieces of the tagpick picker: input events, the key table that maps
//! keys to picker roles, and the logging shims used by every crate.

pub mod event;
pub mod keys;
pub mod logging;

#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace};
