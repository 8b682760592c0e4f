//! Logging macros that compile to nothing unless the `tracing` feature is on.

/// Emit a trace-level event.
#[cfg(any(test, feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(any(test, feature = "tracing")))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Emit a debug-level event.
#[cfg(any(test, feature = "tracing"))]
macro_rules! debug {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(any(test, feature = "tracing")))]
macro_rules! debug {
    ($($arg:tt)*) => {};
}
