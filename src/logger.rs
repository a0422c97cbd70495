//! This module provides a built-in logger implementation.
//!
//! The built-in logger uses the `env_logger` crate. It is enabled by the
//! Cargo feature "builtin_env_logger", which is enabled by default. When
//! enabled, it is initialized by [`crate::memory_manager::init`] and shows
//! logs of level INFO or lower (the lower, the more important).
//!
//! This gives front ends a working logger out of the box, configurable from
//! environment variables, without forcing a particular logging framework on
//! them: a front end that wants its own can disable "builtin_env_logger" and
//! register its own implementation with the `log` crate instead.

/// Attempt to init an env_logger for the core. Does nothing if the
/// "builtin_env_logger" feature is disabled.
pub(crate) fn try_init() {
    cfg_if::cfg_if! {
        if #[cfg(feature = "builtin_env_logger")] {
            let result = env_logger::try_init_from_env(
                env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
            );

            match result {
                Ok(()) => {
                    log::debug!("lispmem initialized the logger.");
                }
                Err(e) => {
                    // `log::SetLoggerError` is only raised when a logger is already registered.
                    log::debug!("lispmem failed to initialize the built-in env_logger: {e}");
                }
            }
        } else {
            log::debug!("lispmem didn't initialize the built-in env_logger: \"builtin_env_logger\" is not enabled.");
        }
    }
}
