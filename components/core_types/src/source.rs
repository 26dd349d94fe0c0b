//! Source position type used to locate errors in evaluated code.

use std::fmt;

/// Represents a position in source code.
///
/// Lines and columns are 1-based; `offset` counts characters from the start
/// of the source text.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition::new(3, 7, 42);
///
/// assert_eq!(pos.line, 3);
/// assert_eq!(pos.to_string(), "3:7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourcePosition {
    /// Line number (1-indexed)
    pub line: u32,
    /// Column number (1-indexed)
    pub column: u32,
    /// Character offset from the start of the source text
    pub offset: usize,
}

impl SourcePosition {
    /// Creates a new source position.
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        SourcePosition {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
