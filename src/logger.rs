//! Diagnostic output, abstracted behind a trait so the allocator never
//! assumes a particular debug-print sink is available.
//!
//! An allocator has no business assuming a console exists at all: it might
//! be running before one is set up, or in a host test with only `std::io`
//! around. Diagnostics here go through [`Logger`], and
//! [`dbg_info!`]/[`dbg_error!`] format arguments lazily via
//! `core::fmt::Arguments`, costing nothing when the logger drops them.

/// Severity of a logged message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// A sink for allocator diagnostics.
///
/// `ctx` names the call site (`"checkheap"`, `"extend"`, ...) and `line` is
/// the caller-supplied source line, so a single logger can multiplex
/// diagnostics from several call sites without needing `#[track_caller]`
/// support from `core::fmt`.
pub trait Logger {
    fn log(&self, level: Level, ctx: &str, line: i32, args: core::fmt::Arguments<'_>);
}

/// A [`Logger`] that discards everything. The default for [`crate::Allocator`]
/// when no logger is supplied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _ctx: &str, _line: i32, _args: core::fmt::Arguments<'_>) {}
}

/// A [`Logger`] that writes to standard error, for hosted builds and tests.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdLogger;

#[cfg(feature = "std")]
impl Logger for StdLogger {
    fn log(&self, level: Level, ctx: &str, line: i32, args: core::fmt::Arguments<'_>) {
        let tag = match level {
            Level::Info => "info",
            Level::Error => "error",
        };
        std::eprintln!("[{}] {}:{}: {}", tag, ctx, line, args);
    }
}

/// Logs an informational message through `$logger`.
#[macro_export]
macro_rules! dbg_info {
    ($logger:expr, $ctx:expr, $line:expr, $($arg:tt)*) => {
        $crate::Logger::log($logger, $crate::Level::Info, $ctx, $line, format_args!($($arg)*))
    };
}

/// Logs an error message through `$logger`.
#[macro_export]
macro_rules! dbg_error {
    ($logger:expr, $ctx:expr, $line:expr, $($arg:tt)*) => {
        $crate::Logger::log($logger, $crate::Level::Error, $ctx, $line, format_args!($($arg)*))
    };
}
