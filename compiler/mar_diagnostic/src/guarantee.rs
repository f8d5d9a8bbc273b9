//! Proof that an error has been reported.

use std::fmt;

/// Proof that at least one error was emitted.
///
/// Cannot be constructed outside this crate except through
/// [`ErrorGuaranteed::from_error_count`], so holding one means a diagnostic
/// with severity `error` really reached a queue.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    /// Only the queue mints guarantees directly.
    pub(crate) const fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Create a guarantee from an error count, if any errors were counted.
    pub fn from_error_count(count: usize) -> Option<Self> {
        (count > 0).then(Self::new)
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("error(s) emitted")
    }
}
