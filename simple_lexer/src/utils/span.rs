//! Source location tracking for the tokenizer
//!
//! Positions are 1-based line/column pairs counted in bytes. Spans are
//! inclusive on both ends, so a one-byte token starts and ends at the
//! same position.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in source text with line and column.
///
/// Ordering is lexicographic: line first, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextPosition {
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based, counted in bytes)
    pub column: usize,
}

impl TextPosition {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        debug_assert!(line >= 1 && column >= 1, "Positions are 1-based");
        Self { line, column }
    }

    /// The first byte of a stream (line 1, column 1)
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Position of the next byte on the same line
    pub fn next_column(self) -> Self {
        Self {
            line: self.line,
            column: self.column + 1,
        }
    }

    /// Position of the first byte on the following line
    pub fn next_line(self) -> Self {
        Self {
            line: self.line + 1,
            column: 1,
        }
    }

    /// Position of the byte before this one.
    ///
    /// `previous_line_columns` is the column the cursor had reached on the
    /// previous line when its newline was consumed. At the very start of the
    /// stream there is no earlier byte and the start position is returned.
    pub fn previous(self, previous_line_columns: usize) -> Self {
        if self.column != 1 {
            Self {
                line: self.line,
                column: self.column - 1,
            }
        } else if self.line > 1 {
            debug_assert!(previous_line_columns >= 1, "Columns are 1-based");
            Self {
                line: self.line - 1,
                column: previous_line_columns,
            }
        } else {
            Self::start()
        }
    }
}

impl Default for TextPosition {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// An inclusive span of source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextSpan {
    /// Position of the first byte
    pub start: TextPosition,
    /// Position of the last byte
    pub end: TextPosition,
}

impl TextSpan {
    /// Create a new span
    pub fn new(start: TextPosition, end: TextPosition) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Get the start position of this span
    pub fn start(&self) -> TextPosition {
        self.start
    }

    /// Get the end position of this span
    pub fn end(&self) -> TextPosition {
        self.end
    }

    /// Span covering exactly one position
    pub fn single(pos: TextPosition) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// Number of lines touched by this span
    pub fn line_count(&self) -> usize {
        self.end.line - self.start.line + 1
    }

    /// Check if this span contains a position
    pub fn contains(&self, pos: TextPosition) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Smallest span covering both spans
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for TextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        let a = TextPosition::new(1, 9);
        let b = TextPosition::new(2, 1);
        let c = TextPosition::new(2, 3);

        assert!(a < b);
        assert!(b < c);
        assert_eq!(a.max(c), c);
    }

    #[test]
    fn test_previous_position() {
        assert_eq!(
            TextPosition::new(3, 5).previous(0),
            TextPosition::new(3, 4)
        );
        // First column falls back to the end of the previous line
        assert_eq!(
            TextPosition::new(2, 1).previous(7),
            TextPosition::new(1, 7)
        );
        assert_eq!(TextPosition::start().previous(0), TextPosition::start());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "Columns are 1-based")]
    fn test_previous_line_needs_recorded_column() {
        TextPosition::new(2, 1).previous(0);
    }

    #[test]
    fn test_span_display() {
        let single = TextSpan::new(TextPosition::new(1, 8), TextPosition::new(1, 13));
        assert_eq!(single.to_string(), "1:8-13");

        let multi = TextSpan::new(TextPosition::new(1, 8), TextPosition::new(2, 7));
        assert_eq!(multi.to_string(), "1:8-2:7");
        assert_eq!(multi.line_count(), 2);
    }

    #[test]
    fn test_span_contains_and_merge() {
        let first = TextSpan::new(TextPosition::new(1, 1), TextPosition::new(1, 6));
        let second = TextSpan::new(TextPosition::new(2, 1), TextPosition::new(2, 6));

        assert!(first.contains(TextPosition::new(1, 6)));
        assert!(!first.contains(TextPosition::new(1, 7)));

        let merged = first.merge(second);
        assert_eq!(merged.start, TextPosition::new(1, 1));
        assert_eq!(merged.end, TextPosition::new(2, 6));
        assert!(merged.contains(TextPosition::new(1, 200)));
    }

    #[test]
    fn test_span_serializes() {
        let span = TextSpan::single(TextPosition::new(4, 2));
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(
            json,
            r#"{"start":{"line":4,"column":2},"end":{"line":4,"column":2}}"#
        );
    }
}
