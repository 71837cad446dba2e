//! Line/column positions and ranges over source text.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A zero-based line/column position, UTF-16 code-unit counted (matching
/// the LSP wire protocol's `Position`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A half-open `[start, end)` range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub const fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// True if `pos` falls within `[start, end)`.
    ///
    /// For a zero-width range (`start == end`), the single position
    /// `start` is considered contained, matching editor expectations for
    /// an empty-range diagnostic anchor.
    pub fn contains(&self, pos: Position) -> bool {
        if self.start == self.end {
            return pos == self.start;
        }
        pos >= self.start && pos < self.end
    }

    /// True if `other` overlaps this range at all.
    pub fn intersects(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of lines this range spans, end-inclusive start-exclusive
    /// (a single-line range spans 0 "extra" lines).
    pub fn line_span(&self) -> u32 {
        self.end.line.saturating_sub(self.start.line)
    }

    /// Orders ranges by start position (ascending), then by end position
    /// ascending — i.e. the *tighter* range sorts first among equal
    /// starts. This is the ordering `node_at`'s tie-break relies on: among
    /// nodes whose ranges share a start, prefer the one with the earliest
    /// end (the most specific).
    pub fn cmp_by_specificity(&self, other: &Range) -> Ordering {
        // Latest start first (innermost), then earliest end (tightest).
        other.start.cmp(&self.start).then_with(|| self.end.cmp(&other.end))
    }
}

#[cfg(feature = "lsp-compat")]
impl From<Position> for lsp_types::Position {
    fn from(p: Position) -> Self {
        Self { line: p.line, character: p.column }
    }
}

#[cfg(feature = "lsp-compat")]
impl From<lsp_types::Position> for Position {
    fn from(p: lsp_types::Position) -> Self {
        Self { line: p.line, column: p.character }
    }
}

#[cfg(feature = "lsp-compat")]
impl From<Range> for lsp_types::Range {
    fn from(r: Range) -> Self {
        Self { start: r.start.into(), end: r.end.into() }
    }
}

#[cfg(feature = "lsp-compat")]
impl From<lsp_types::Range> for Range {
    fn from(r: lsp_types::Range) -> Self {
        Self { start: r.start.into(), end: r.end.into() }
    }
}
