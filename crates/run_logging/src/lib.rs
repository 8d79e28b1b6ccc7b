#![deny(missing_docs)]
//! Shared logging utilities for the forwarding workspace.
//!
//! This crate provides the `run_*` logging macros used by the engine and the
//! binary, plus a minimal test initializer for the global logger. Everything
//! goes through the `log` facade; the binary decides where records end up.

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! run_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: "mailbox_forward", $($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! run_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: "mailbox_forward", $($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! run_info {
    ($($arg:tt)*) => {{
        log::info!(target: "mailbox_forward", $($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! run_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: "mailbox_forward", $($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! run_error {
    ($($arg:tt)*) => {{
        log::error!(target: "mailbox_forward", $($arg)*);
    }};
}

/// Target name shared by every `run_*` macro, so the binary can filter on it.
pub const LOG_TARGET: &str = "mailbox_forward";

/// Initializes a simple terminal logger for use in tests.
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
