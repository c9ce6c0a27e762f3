#![deny(missing_docs)]
//! Shared logging utilities for the snapshot workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every message is
//! prefixed with the pipeline step that is currently running on the thread.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the pipeline step currently running.
    static RUN_STEP: Cell<&'static str> = const { Cell::new("idle") };
}

/// Sets the pipeline step label for the current thread.
/// The reconciliation pipeline calls this when it moves to the next step.
pub fn set_run_step(step: &'static str) {
    RUN_STEP.with(|v| v.set(step));
}

/// Retrieves the pipeline step label for the current thread.
/// Returns `"idle"` if no step has been set.
pub fn run_step() -> &'static str {
    RUN_STEP.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!("[{}] {}", $crate::run_step(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!("[{}] {}", $crate::run_step(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!("[{}] {}", $crate::run_step(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!("[{}] {}", $crate::run_step(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!("[{}] {}", $crate::run_step(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_step_defaults_to_idle_and_is_per_thread() {
        assert_eq!(run_step(), "idle");
        set_run_step("sections");
        assert_eq!(run_step(), "sections");

        let other = std::thread::spawn(run_step).join().unwrap();
        assert_eq!(other, "idle");
    }
}
