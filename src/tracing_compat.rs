//! Optional tracing integration.
//!
//! With the `tracing-integration` feature (on by default) the macros here are
//! the `tracing` crate's own. Without it they expand to nothing, so library
//! code can log unconditionally through `crate::tracing_compat::*`.

#[cfg(feature = "tracing-integration")]
pub(crate) use tracing::{debug, error, info, warn};

#[cfg(not(feature = "tracing-integration"))]
mod noop {
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
    macro_rules! error {
        ($($arg:tt)*) => {};
    }
    macro_rules! info {
        ($($arg:tt)*) => {};
    }
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    pub(crate) use {debug, error, info, warn};
}

#[cfg(not(feature = "tracing-integration"))]
pub(crate) use noop::{debug, error, info, warn};
