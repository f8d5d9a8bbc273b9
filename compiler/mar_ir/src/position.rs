//! Source positions.
//!
//! A `Position` is a byte offset plus the 1-based line it falls on. A
//! `Location` pairs a position with the path of the manifest it belongs to,
//! which is what diagnostics need to point at a precise source line.

use std::fmt;
use std::sync::Arc;

/// Position of a node within one manifest.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub struct Position {
    /// Byte offset from the start of the file.
    pub offset: u32,
    /// 1-based line number (0 for generated nodes).
    pub line: u32,
}

impl Position {
    /// Position for generated code.
    pub const DUMMY: Position = Position { offset: 0, line: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(offset: u32, line: u32) -> Self {
        Position { offset, line }
    }

    /// Create a position from a line number alone.
    #[inline]
    pub const fn line(line: u32) -> Self {
        Position { offset: 0, line }
    }

    /// Check whether this position was produced by the parser.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}

/// A position within a specific manifest file.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    pub path: Arc<str>,
    pub position: Position,
}

impl Location {
    pub fn new(path: Arc<str>, position: Position) -> Self {
        Location { path, position }
    }

    /// Line number of this location.
    #[inline]
    pub fn line(&self) -> u32 {
        self.position.line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path, self.position.line)
    }
}

#[cfg(test)]
mod tests;
