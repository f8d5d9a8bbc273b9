//! Stack growth for deeply nested manifests.
//!
//! Evaluation recurses through nested expressions, parent class
//! declarations and block invocations. Each recursive entry point runs
//! through [`with_stack`], which moves onto a fresh `stacker` segment when
//! the remaining stack drops below the red zone.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each newly allocated stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, growing the stack first if it is nearly exhausted.
#[inline]
pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}
