#![forbid(unsafe_code)]

//! Logging shims.
//!
//! The picker logs through `debug!`, `trace!` and `debug_span!`. With the
//! `tracing` feature these are the `tracing` macros; without it they expand to
//! nothing (or to a [`NoopSpan`]), so call sites compile either way.
//!
//! `tracing-json` adds [`init_json_subscriber`] for hosts that want
//! newline-delimited JSON logs filtered through `RUST_LOG`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Expands to nothing without the `tracing` feature.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Expands to nothing without the `tracing` feature.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Expands to a [`NoopSpan`](crate::logging::NoopSpan) without the
    /// `tracing` feature.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Stand-in for `tracing::Span` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy)]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the span; does nothing.
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }

    /// Consume and enter the span; does nothing.
    pub fn entered(self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard returned by [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
#[derive(Debug)]
pub struct NoopGuard;

/// Install a global JSON subscriber writing to `writer`.
///
/// The filter comes from `RUST_LOG`, falling back to `default_directive`
/// (for example `"tagpick=debug"`). Returns `false` if a global subscriber
/// was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber<W>(writer: W, default_directive: &str) -> bool
where
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .is_ok()
}
