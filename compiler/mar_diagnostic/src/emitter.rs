//! Diagnostic emitters.
//!
//! An emitter writes diagnostics to an output stream. Only a plain-text
//! format exists; the trait is the seam for adding others.

use std::io::{self, Write};

use crate::Diagnostic;

/// Trait for emitting diagnostics in a particular format.
pub trait DiagnosticEmitter {
    /// Emit a single diagnostic.
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()>;

    /// Emit multiple diagnostics.
    fn emit_all(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        for diag in diagnostics {
            self.emit(diag)?;
        }
        Ok(())
    }

    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;

    /// Emit a summary line, e.g. "2 errors".
    fn emit_summary(&mut self, error_count: usize) -> io::Result<()>;
}

/// Returns "s" for plural counts, "" for singular.
#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Plain-text emitter.
///
/// ```text
/// error[E6012]: could not find class 'web'
///   --> site.pp:4
///   = note: ...
/// ```
pub struct TextEmitter<W: Write> {
    writer: W,
}

impl<W: Write> TextEmitter<W> {
    pub fn new(writer: W) -> Self {
        TextEmitter { writer }
    }

    /// Consume the emitter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextEmitter<io::Stderr> {
    pub fn stderr() -> Self {
        TextEmitter::new(io::stderr())
    }
}

impl<W: Write> DiagnosticEmitter for TextEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        writeln!(self.writer, "{diagnostic}")?;
        if let Some(location) = &diagnostic.location {
            writeln!(self.writer, "  --> {location}")?;
        }
        for note in &diagnostic.notes {
            writeln!(self.writer, "  = note: {note}")?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn emit_summary(&mut self, error_count: usize) -> io::Result<()> {
        if error_count > 0 {
            writeln!(
                self.writer,
                "compilation failed with {error_count} error{}",
                plural_s(error_count)
            )?;
        }
        Ok(())
    }
}
