//! Logging for the spatial index and its owners
//!
//! - Pluggable sink via the [`Logger`] trait
//! - Severity levels with a global minimum (see [`Diagnostics::set_min_severity`])
//! - Colored console output by default
//! - `kd_error!` records the file and line of the call site
//!
//! [`Diagnostics::set_min_severity`]: crate::kd3d::Diagnostics::set_min_severity

use chrono::{DateTime, Local};
use colored::*;
use std::time::SystemTime;

/// Destination for log entries
///
/// # Example
///
/// ```no_run
/// use kd_index::kd3d::log::{Logger, LogEntry};
///
/// struct CountingLogger {
///     count: std::sync::atomic::AtomicUsize,
/// }
///
/// impl Logger for CountingLogger {
///     fn log(&self, _entry: &LogEntry) {
///         self.count.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    /// Handle one entry
    fn log(&self, entry: &LogEntry);
}

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Time the entry was created
    pub timestamp: SystemTime,

    /// Emitting component (e.g. "kd3d::SpatialIndex", "marbles::Field")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for `kd_error!`)
    pub file: Option<&'static str>,

    /// Source line (only for `kd_error!`)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    /// Per-operation detail (clear, per-tick bookkeeping)
    Trace,

    /// Rebuild and removal summaries
    Debug,

    /// Lifecycle events
    Info,

    /// Suspicious but recoverable situations
    Warn,

    /// Failed operations, with file:line
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by [`DefaultLogger`]
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Console logger with colors
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogger;

impl DefaultLogger {
    /// Render an entry without colors.
    ///
    /// Used by tests and by loggers that write to files.
    pub fn format_plain(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f");

        match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                entry.severity.label(),
                entry.source,
                entry.message,
                file,
                line
            ),
            _ => format!(
                "[{}] [{}] [{}] {}",
                timestamp,
                entry.severity.label(),
                entry.source,
                entry.message
            ),
        }
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let label = entry.severity.label();
        let severity_str = match entry.severity {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            );
        } else {
            println!(
                "[{}] [{}] [{}] {}",
                timestamp, severity_str, source, entry.message
            );
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
///
/// ```no_run
/// kd_index::kd_trace!("kd3d::SpatialIndex", "cleared {} nodes", 12);
/// ```
#[macro_export]
macro_rules! kd_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::kd3d::Diagnostics::log(
            $crate::kd3d::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
///
/// ```no_run
/// kd_index::kd_debug!("kd3d::SpatialIndex", "rebuilt {} nodes", 500);
/// ```
#[macro_export]
macro_rules! kd_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::kd3d::Diagnostics::log(
            $crate::kd3d::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
///
/// ```no_run
/// kd_index::kd_info!("marbles::Simulation", "spawned {} hunters", 1000);
/// ```
#[macro_export]
macro_rules! kd_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::kd3d::Diagnostics::log(
            $crate::kd3d::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
///
/// ```no_run
/// kd_index::kd_warn!("kd3d::SpatialIndex", "tree depth {} for {} items", 400, 500);
/// ```
#[macro_export]
macro_rules! kd_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::kd3d::Diagnostics::log(
            $crate::kd3d::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// ```no_run
/// kd_index::kd_error!("kd3d::SpatialIndex", "index {} out of range", 9);
/// ```
#[macro_export]
macro_rules! kd_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::kd3d::Diagnostics::log_detailed(
            $crate::kd3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
