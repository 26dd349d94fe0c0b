//! Instruction ranges for the dispatch loop

/// A half-open range `[ip, end)` of instructions still to run.
///
/// The dispatcher keeps a stack of these. A branch pushes the code after
/// its `ENDIF` as a continuation and switches to the chosen block; when a
/// block runs out the continuation is popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFrame {
    /// Next instruction to execute
    pub ip: usize,
    /// One past the last instruction of the range
    pub end: usize,
}

impl ScopeFrame {
    /// Create a frame covering `[ip, end)`
    pub fn new(ip: usize, end: usize) -> Self {
        Self { ip, end }
    }

    /// True once every instruction of the range has run
    pub fn is_done(&self) -> bool {
        self.ip >= self.end
    }
}
