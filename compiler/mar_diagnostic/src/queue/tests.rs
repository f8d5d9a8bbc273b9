use super::*;
use crate::ErrorCode;
use mar_ir::Position;
use pretty_assertions::assert_eq;

fn loc(line: u32) -> Location {
    Location::new("site.pp".into(), Position::line(line))
}

#[test]
fn test_log_returns_guarantee_only_for_errors() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.log(Severity::Notice, Some(loc(1)), "hello").is_none());
    assert!(queue.log(Severity::Error, Some(loc(2)), "boom").is_some());
    assert_eq!(queue.error_count(), 1);
    assert_eq!(queue.diagnostics().len(), 2);
}

#[test]
fn test_deduplicate_same_location_and_message() {
    let mut queue = DiagnosticQueue::new();
    queue.log(Severity::Error, Some(loc(3)), "boom");
    queue.log(Severity::Error, Some(loc(3)), "boom");
    queue.log(Severity::Error, Some(loc(4)), "boom");
    assert_eq!(queue.diagnostics().len(), 2);
    assert_eq!(queue.error_count(), 3);
}

#[test]
fn test_no_deduplication_when_disabled() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.log(Severity::Warning, None, "same");
    queue.log(Severity::Warning, None, "same");
    assert_eq!(queue.diagnostics().len(), 2);
    assert!(!queue.has_errors());
}

#[test]
fn test_error_limit() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    for line in 1..=4 {
        queue.log(Severity::Error, Some(loc(line)), "boom");
    }
    // Non-errors are never limited.
    queue.log(Severity::Notice, None, "still here");

    assert!(queue.limit_reached());
    assert_eq!(queue.error_count(), 4);
    assert_eq!(queue.diagnostics().len(), 3);
}

#[test]
fn test_emit_error_forces_error_severity() {
    let mut queue = DiagnosticQueue::new();
    let diag = Diagnostic::new(Severity::Notice, "promoted").with_code(ErrorCode::E6010);
    let _guarantee = queue.emit_error(diag);
    assert_eq!(queue.diagnostics()[0].severity, Severity::Error);
    assert_eq!(queue.error_count(), 1);
}

#[test]
fn test_flush_keeps_error_count() {
    let mut queue = DiagnosticQueue::new();
    queue.log(Severity::Error, Some(loc(1)), "boom");
    let drained = queue.flush();
    assert_eq!(drained.len(), 1);
    assert!(queue.diagnostics().is_empty());
    assert!(queue.has_errors());
}
