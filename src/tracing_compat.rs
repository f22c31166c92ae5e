//! Optional tracing integration.
//!
//! With the `tracing-integration` feature enabled this module re-exports the
//! `tracing` event macros. Without it, the same names expand to nothing so
//! call sites need no `cfg` guards and pay no cost.
//!
//! ```ignore
//! use crate::tracing_compat::{debug, warn};
//!
//! debug!(meta = ?key, "codec transform created");
//! warn!(error = %err, "message ignored");
//! ```

#[cfg(feature = "tracing-integration")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    /// No-op `trace!` when tracing integration is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __codec_transform_trace {
        ($($arg:tt)*) => {};
    }

    /// No-op `debug!` when tracing integration is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __codec_transform_debug {
        ($($arg:tt)*) => {};
    }

    /// No-op `info!` when tracing integration is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __codec_transform_info {
        ($($arg:tt)*) => {};
    }

    /// No-op `warn!` when tracing integration is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __codec_transform_warn {
        ($($arg:tt)*) => {};
    }

    /// No-op `error!` when tracing integration is disabled.
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __codec_transform_error {
        ($($arg:tt)*) => {};
    }
}

#[cfg(not(feature = "tracing-integration"))]
pub use crate::{
    __codec_transform_debug as debug, __codec_transform_error as error,
    __codec_transform_info as info, __codec_transform_trace as trace,
    __codec_transform_warn as warn,
};
