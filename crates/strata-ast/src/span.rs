// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Byte spans and their line/column positions.

use std::fmt;

/// A byte range in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A human-facing position: 1-based line and column plus the text of that line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub line: u32,
    pub column: u32,
    pub snippet: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Maps byte offsets to 1-based line and column numbers.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Offset just past each `\n`, preceded by 0 for the first line.
    starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let newlines = source.match_indices('\n').map(|(i, _)| i + 1);
        LineMap {
            starts: std::iter::once(0).chain(newlines).collect(),
        }
    }

    /// Index into `starts` of the line holding `offset`.
    fn line_index(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset).max(1) - 1
    }

    /// `(line, column)` of a byte offset; columns count bytes.
    pub fn offset_to_line_col(&self, offset: usize) -> (u32, u32) {
        let idx = self.line_index(offset);
        let column = offset - self.starts[idx];
        (idx as u32 + 1, column as u32 + 1)
    }

    /// Text of a 1-based line with its line terminator stripped.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = usize::try_from(line).ok()?.checked_sub(1)?;
        let from = *self.starts.get(idx)?;
        let to = self.starts.get(idx + 1).map_or(source.len(), |next| next - 1);
        let text = source.get(from..to)?;
        Some(text.strip_suffix('\r').unwrap_or(text))
    }

    pub fn locate(&self, source: &str, offset: usize) -> Location {
        let (line, column) = self.offset_to_line_col(offset);
        let snippet = self.line_text(source, line).unwrap_or_default().to_owned();
        Location { line, column, snippet }
    }

    pub fn line_count(&self) -> u32 {
        self.starts.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_has_one_line() {
        let map = LineMap::new("");
        assert_eq!(map.offset_to_line_col(0), (1, 1));
        assert_eq!(map.line_count(), 1);
        assert_eq!(map.line_text("", 1), Some(""));
        assert_eq!(map.line_text("", 0), None);
    }

    #[test]
    fn lines_and_columns() {
        let src = "let a: int = 1\nio.print(a)\n";
        let map = LineMap::new(src);
        assert_eq!(map.offset_to_line_col(4), (1, 5));
        assert_eq!(map.offset_to_line_col(14), (1, 15));
        assert_eq!(map.offset_to_line_col(15), (2, 1));
        assert_eq!(map.line_text(src, 2), Some("io.print(a)"));
        assert_eq!(map.line_text(src, 3), Some(""));
        assert_eq!(map.line_count(), 3);
    }

    #[test]
    fn locate_carries_snippet() {
        let src = "var x: int = 0\r\nx = \"s\"";
        let loc = LineMap::new(src).locate(src, 20);
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 5);
        assert_eq!(loc.snippet, "x = \"s\"");
        assert_eq!(loc.to_string(), "2:5");
    }

    #[test]
    fn span_union() {
        assert_eq!(Span::new(4, 6).to(Span::new(1, 2)), Span::new(1, 6));
    }
}
