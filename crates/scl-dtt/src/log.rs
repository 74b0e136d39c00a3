// crates/scl-dtt/src/log.rs
//! Context-prefixed wrappers around the `log` macros.

use alloc::string::String;

/// Trait for values that provide a logging context prefix.
pub trait LogMetadata {
    fn meta(&self) -> String;
}

impl<T: LogMetadata + ?Sized> LogMetadata for &T {
    fn meta(&self) -> String {
        (**self).meta()
    }
}

// =============================================
// Logging Macros (namespaced under crate::log)
// =============================================

// ===== ctx_warn! =====
macro_rules! ctx_warn {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::warn!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== ctx_debug! =====
macro_rules! ctx_debug {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        log::debug!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== ctx_trace! =====
macro_rules! ctx_trace {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        if log::log_enabled!(log::Level::Trace) {
            let meta = $crate::log::LogMetadata::meta(&$ctx);
            log::trace!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
        }
    }};
}

// Re-export macros for use in other files
pub(crate) use ctx_debug;
pub(crate) use ctx_trace;
pub(crate) use ctx_warn;
