//! Source location tracking for the lunet tokenizer

#![allow(clippy::cast_possible_truncation)] // We intentionally use u32 for offsets; files > 4GB are unsupported

/// Source location with line and column information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// 1-indexed line number
    pub line: u32,
    /// 1-indexed column number
    pub column: u32,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A region of source code, carried by tokens and errors for diagnostics.
///
/// Holds both byte offsets (end exclusive) and the resolved line/column
/// locations of its bounds. Regions never influence parsing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Byte offset of the start of the region
    pub start_offset: u32,
    /// Byte offset of the end of the region (exclusive)
    pub end_offset: u32,
    /// Line/column of the start of the region
    pub start: Location,
    /// Line/column of the end of the region
    pub end: Location,
}

impl Region {
    /// Create a new region from offsets and resolved locations
    #[must_use]
    pub const fn new(start_offset: u32, end_offset: u32, start: Location, end: Location) -> Self {
        Self {
            start_offset,
            end_offset,
            start,
            end,
        }
    }

    /// Length of the region in bytes
    #[must_use]
    pub const fn len(&self) -> u32 {
        self.end_offset - self.start_offset
    }

    /// Returns true if the region is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_offset == self.end_offset
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start)
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::new(0, 0, Location::new(1, 1), Location::new(1, 1))
    }
}

/// Maps byte offsets to line/column locations
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offsets where each line starts
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index from source code
    #[must_use]
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a line/column location
    #[must_use]
    pub fn location(&self, offset: u32) -> Location {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        Location {
            line: (line + 1) as u32,
            column: offset - line_start + 1,
        }
    }

    /// Resolve a byte range into a full region
    #[must_use]
    pub fn region(&self, range: std::ops::Range<usize>) -> Region {
        let start_offset = range.start as u32;
        let end_offset = range.end as u32;
        Region::new(
            start_offset,
            end_offset,
            self.location(start_offset),
            self.location(end_offset),
        )
    }

    /// Get the number of lines
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_basics() {
        let index = LineIndex::new("local a = 1");
        let region = index.region(6..7);
        assert_eq!(region.len(), 1);
        assert!(!region.is_empty());
        assert_eq!(region.start, Location::new(1, 7));
    }

    #[test]
    fn line_index_single_line() {
        let index = LineIndex::new("hello world");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.location(0), Location::new(1, 1));
        assert_eq!(index.location(6), Location::new(1, 7));
    }

    #[test]
    fn line_index_multiple_lines() {
        let index = LineIndex::new("line1\nline2\nline3");
        assert_eq!(index.line_count(), 3);
        assert_eq!(index.location(0), Location::new(1, 1));
        assert_eq!(index.location(5), Location::new(1, 6)); // newline char
        assert_eq!(index.location(6), Location::new(2, 1)); // start of line2
        assert_eq!(index.location(12), Location::new(3, 1)); // start of line3
    }

    #[test]
    fn region_spanning_lines() {
        let index = LineIndex::new("a\nbc\nd");
        let region = index.region(2..6);
        assert_eq!(region.start, Location::new(2, 1));
        assert_eq!(region.end, Location::new(3, 2));
        assert_eq!(region.to_string(), "2:1");
    }
}
