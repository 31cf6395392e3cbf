// src/macros.rs
#[macro_export]
macro_rules! s {
    // String shorthand!

    // Zero-arg → String::new()
    () => {
        ::std::string::String::new()
    };
    // Any single expression
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! logw {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        ::tracing::error!($($arg)*)
    };
}

/// Named fixed wait. The portal exposes no readiness signal, so every pause
/// is a configured duration with a reason that ends up in the log.
#[macro_export]
macro_rules! settle {
    ($dur:expr, $why:expr) => {{
        let d: ::std::time::Duration = $dur;
        if !d.is_zero() {
            $crate::logd!("waiting {:?}: {}", d, $why);
            ::std::thread::sleep(d);
        }
    }};
}
