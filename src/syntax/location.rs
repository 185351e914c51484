//! Source positions and the comment text attached to declarations.

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open source range covered by a node.
///
/// `end` is the location just past the last token of the node. The file
/// name is not repeated per span; it lives on the owning
/// [`Program`](super::Program).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: SourceLocation,
    pub end: SourceLocation,
}

impl Span {
    pub fn new(start: SourceLocation, end: SourceLocation) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `loc`.
    pub fn at(loc: SourceLocation) -> Self {
        Self {
            start: loc,
            end: loc,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Comment text surrounding a declaration, kept verbatim (delimiters
/// included) so an emitter can reproduce it around replacement text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comments {
    /// Comments on the lines before the declaration.
    pub before: Vec<String>,
    /// Comments after the declaration on its final line.
    pub suffix: Vec<String>,
    /// Comments after the declaration that belong to nothing else
    /// (the tail of the file).
    pub after: Vec<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.suffix.is_empty() && self.after.is_empty()
    }
}
