//! Span and position types for source locations.

use serde::{Deserialize, Serialize};

/// A position in source text.
///
/// Uses 1-indexed lines and 0-indexed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (0-indexed, in bytes).
    pub column: u32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A span representing a range in source text.
///
/// Uses byte offsets (0-indexed) for efficient slicing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// Start byte offset (0-indexed, inclusive).
    pub start: u32,
    /// End byte offset (0-indexed, exclusive).
    pub end: u32,
}

impl Span {
    /// Creates a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `offset`.
    #[inline]
    pub const fn empty(offset: u32) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the length of the span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns true if the span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this span contains the given offset.
    #[inline]
    pub const fn contains(&self, offset: u32) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Returns true if `other` lies entirely inside this span.
    ///
    /// Both ends are inclusive, so an empty span at `end` is still contained.
    #[inline]
    pub const fn contains_span(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns true if the two spans overlap or touch.
    #[inline]
    pub const fn intersects(&self, other: &Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Returns the slice of `source` covered by this span.
    ///
    /// Returns an empty string when the span is out of bounds or does not
    /// fall on character boundaries.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source
            .get(self.start as usize..self.end as usize)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Location information combining start and end positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// Start position.
    pub start: Position,
    /// End position.
    pub end: Position,
}

impl Location {
    /// Creates a new location.
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(span.contains(15));
        assert!(!span.contains(5));
        assert!(!span.contains(20));
    }

    #[test]
    fn test_contains_span() {
        let outer = Span::new(0, 100);
        assert!(outer.contains_span(&Span::new(20, 30)));
        assert!(outer.contains_span(&Span::new(0, 100)));
        assert!(outer.contains_span(&Span::empty(100)));
        assert!(!outer.contains_span(&Span::new(90, 101)));
    }

    #[test]
    fn test_intersects() {
        let span = Span::new(10, 20);
        assert!(span.intersects(&Span::new(15, 25)));
        assert!(span.intersects(&Span::new(20, 25)));
        assert!(span.intersects(&Span::empty(10)));
        assert!(!span.intersects(&Span::new(21, 30)));
        assert!(!span.intersects(&Span::new(0, 9)));
    }

    #[test]
    fn test_empty_span() {
        let span = Span::empty(5);
        assert!(span.is_empty());
        assert_eq!(span.len(), 0);
        assert!(!span.contains(5));
    }

    #[test]
    fn test_slice() {
        let source = "hello world";
        assert_eq!(Span::new(6, 11).slice(source), "world");
        assert_eq!(Span::new(6, 99).slice(source), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::new(3, 7).to_string(), "3..7");
    }

    #[test]
    fn test_location() {
        let loc = Location::new(Position::new(1, 0), Position::new(1, 10));
        assert_eq!(loc.start.line, 1);
        assert_eq!(loc.end.column, 10);
    }

    #[test]
    fn test_span_deserialization() {
        let json = r#"{"start": 5, "end": 15}"#;
        let span: Span = serde_json::from_str(json).unwrap();
        assert_eq!(span, Span::new(5, 15));
    }
}
