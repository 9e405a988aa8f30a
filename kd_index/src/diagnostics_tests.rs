//! Unit tests for diagnostics.rs
//!
//! IMPORTANT: the logger and the minimum severity are process-wide.
//! Every test touching them is marked #[serial] and restores the defaults.

use crate::diagnostics::Diagnostics;
use crate::log::{LogEntry, LogSeverity, Logger};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures entries for verification.
///
/// Only entries from a "diag::" source are kept, so index tests running in
/// parallel cannot leak into the capture.
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source.starts_with("diag::") {
            self.entries.lock().unwrap().push(entry.clone());
        }
    }
}

fn restore() {
    Diagnostics::reset_logger();
    Diagnostics::set_min_severity(LogSeverity::Info);
}

// ============================================================================
// SEVERITY FILTER TESTS
// ============================================================================

#[test]
#[serial]
fn test_default_min_severity_is_info() {
    restore();
    assert_eq!(Diagnostics::min_severity(), LogSeverity::Info);
    assert!(!Diagnostics::enabled(LogSeverity::Debug));
    assert!(Diagnostics::enabled(LogSeverity::Info));
    assert!(Diagnostics::enabled(LogSeverity::Error));
}

#[test]
#[serial]
fn test_set_min_severity_round_trips() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        Diagnostics::set_min_severity(severity);
        assert_eq!(Diagnostics::min_severity(), severity);
    }
    restore();
}

#[test]
#[serial]
fn test_entries_below_minimum_are_dropped() {
    let (logger, entries) = CaptureLogger::new();
    Diagnostics::set_logger(logger);
    Diagnostics::set_min_severity(LogSeverity::Warn);

    Diagnostics::log(LogSeverity::Debug, "diag::test", "dropped".to_string());
    Diagnostics::log(LogSeverity::Warn, "diag::test", "kept".to_string());

    let captured = entries.lock().unwrap().clone();
    restore();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "kept");
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
#[serial]
fn test_error_macro_records_location() {
    let (logger, entries) = CaptureLogger::new();
    Diagnostics::set_logger(logger);

    crate::kd_error!("diag::test", "failed with {}", 3);

    let captured = entries.lock().unwrap().clone();
    restore();

    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].severity, LogSeverity::Error);
    assert_eq!(captured[0].source, "diag::test");
    assert_eq!(captured[0].message, "failed with 3");
    assert!(captured[0].file.unwrap().ends_with("diagnostics_tests.rs"));
    assert!(captured[0].line.is_some());
}

#[test]
#[serial]
fn test_non_error_macros_have_no_location() {
    let (logger, entries) = CaptureLogger::new();
    Diagnostics::set_logger(logger);
    Diagnostics::set_min_severity(LogSeverity::Trace);

    crate::kd_trace!("diag::test", "t");
    crate::kd_debug!("diag::test", "d");
    crate::kd_info!("diag::test", "i");
    crate::kd_warn!("diag::test", "w");

    let captured = entries.lock().unwrap().clone();
    restore();

    let severities: Vec<LogSeverity> = captured.iter().map(|e| e.severity).collect();
    assert_eq!(
        severities,
        vec![LogSeverity::Trace, LogSeverity::Debug, LogSeverity::Info, LogSeverity::Warn]
    );
    assert!(captured.iter().all(|e| e.file.is_none() && e.line.is_none()));
}

#[test]
#[serial]
fn test_reset_logger_detaches_custom_logger() {
    let (logger, entries) = CaptureLogger::new();
    Diagnostics::set_logger(logger);
    Diagnostics::reset_logger();

    Diagnostics::log(LogSeverity::Error, "diag::test", "to console".to_string());

    assert!(entries.lock().unwrap().is_empty());
    restore();
}
