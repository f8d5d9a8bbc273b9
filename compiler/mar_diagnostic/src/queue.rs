//! Diagnostic queue for collecting and deduplicating diagnostics.
//!
//! Features:
//! - Error limits to prevent overwhelming output
//! - Deduplication of identical diagnostics at the same location
//! - `ErrorGuaranteed` proof that errors were emitted

use std::hash::{Hash, Hasher};

use mar_ir::Location;
use rustc_hash::{FxHashSet, FxHasher};

use crate::{Diagnostic, ErrorGuaranteed, Severity};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors recorded (0 = unlimited).
    pub error_limit: usize,
    /// Drop diagnostics identical to one already recorded.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 10,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

fn fingerprint(diag: &Diagnostic) -> u64 {
    let mut hasher = FxHasher::default();
    diag.severity.hash(&mut hasher);
    diag.location.hash(&mut hasher);
    diag.message.hash(&mut hasher);
    hasher.finish()
}

/// Sink for everything the evaluator reports.
///
/// # Example
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.log(Severity::Notice, Some(location), "hello");
/// let diagnostics = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    /// Count of errors (not warnings/notices), including dropped ones.
    error_count: usize,
    seen: FxHashSet<u64>,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::with_config(DiagnosticConfig::default())
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            diagnostics: Vec::new(),
            error_count: 0,
            seen: FxHashSet::default(),
            config,
        }
    }

    /// Record a message at a source location.
    ///
    /// Returns a guarantee when `severity` is [`Severity::Error`].
    pub fn log(
        &mut self,
        severity: Severity,
        location: Option<Location>,
        message: impl Into<String>,
    ) -> Option<ErrorGuaranteed> {
        let mut diag = Diagnostic::new(severity, message);
        diag.location = location;
        self.emit(diag)
    }

    /// Add a diagnostic.
    ///
    /// Errors always yield a guarantee, even when the diagnostic itself is
    /// dropped by the error limit or deduplication: in both cases an error
    /// has already been recorded.
    pub fn emit(&mut self, diag: Diagnostic) -> Option<ErrorGuaranteed> {
        let is_error = diag.is_error();
        if is_error {
            self.error_count += 1;
        }

        let over_limit = is_error
            && self.config.error_limit > 0
            && self.error_count > self.config.error_limit;
        let duplicate = self.config.deduplicate && !self.seen.insert(fingerprint(&diag));
        if !over_limit && !duplicate {
            self.diagnostics.push(diag);
        }

        is_error.then(ErrorGuaranteed::new)
    }

    /// Add an error diagnostic, returning proof that it was reported.
    pub fn emit_error(&mut self, mut diag: Diagnostic) -> ErrorGuaranteed {
        diag.severity = Severity::Error;
        self.error_count += 1;
        if self.config.error_limit == 0 || self.error_count <= self.config.error_limit {
            let fresh = !self.config.deduplicate || self.seen.insert(fingerprint(&diag));
            if fresh {
                self.diagnostics.push(diag);
            }
        }
        ErrorGuaranteed::new()
    }

    /// Check if the error limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.error_limit > 0 && self.error_count >= self.config.error_limit
    }

    /// Get the number of errors reported.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Diagnostics recorded so far, in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn config(&self) -> &DiagnosticConfig {
        &self.config
    }

    /// Take all recorded diagnostics, leaving the error count intact.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        self.seen.clear();
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests;
