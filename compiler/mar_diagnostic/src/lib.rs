//! Diagnostic system for manifest compilation.
//!
//! The evaluator reports problems through a single sink,
//! [`DiagnosticQueue::log`], which records a severity, an optional source
//! location and a message. Errors additionally carry an [`ErrorCode`] for
//! searchability.
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was written to the queue. Code holding one knows the user has
//! already been told, and must not report the same failure again.
//!
//! ```text
//! let guarantee = queue.emit_error(diagnostic);
//! return Err(error.reported(guarantee));
//! ```

mod diagnostic;
pub mod emitter;
mod error_code;
mod guarantee;
pub mod queue;

pub use diagnostic::{Diagnostic, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
