//! Per-file context and byte/line conversions.

use std::path::{Path, PathBuf};

use crate::call_site::TextRange;
use crate::types::Location;

/// Line start table for converting between byte offsets and positions.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index for `content`.
    #[must_use]
    pub fn new(content: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    /// Converts a byte offset into a 1-indexed line and 1-indexed character
    /// column.
    #[must_use]
    pub fn position(&self, content: &str, offset: usize) -> (usize, usize) {
        let line = self.starts.partition_point(|&start| start <= offset);
        let line_start = self.starts[line.saturating_sub(1)];
        let column = content
            .get(line_start..offset.min(content.len()))
            .map_or(0, |prefix| prefix.chars().count());
        (line.max(1), column + 1)
    }

    /// Converts a 1-indexed line and 0-indexed character column into a byte
    /// offset. Out-of-range positions clamp to the end of the content.
    #[must_use]
    pub fn offset(&self, content: &str, line: usize, column: usize) -> usize {
        let Some(&line_start) = self.starts.get(line.saturating_sub(1)) else {
            return content.len();
        };
        content[line_start..]
            .char_indices()
            .nth(column)
            .map_or(content.len(), |(i, _)| line_start + i)
    }
}

/// Context for the file being analyzed.
#[derive(Debug, Clone)]
pub struct FileContext<'a> {
    /// Absolute path to the file.
    pub path: &'a Path,
    /// File contents as a string.
    pub content: &'a str,
    /// Path relative to the project root.
    pub relative_path: PathBuf,
    lines: LineIndex,
}

impl<'a> FileContext<'a> {
    /// Creates a new file context.
    #[must_use]
    pub fn new(path: &'a Path, content: &'a str, root: &Path) -> Self {
        let relative_path = path
            .strip_prefix(root)
            .map_or_else(|_| path.to_path_buf(), Path::to_path_buf);

        Self {
            path,
            content,
            relative_path,
            lines: LineIndex::new(content),
        }
    }

    /// Builds the reported location of a byte range.
    #[must_use]
    pub fn location(&self, range: TextRange) -> Location {
        let (line, column) = self.lines.position(self.content, range.start);
        Location::new(self.relative_path.clone(), line, column).with_span(range.start, range.len())
    }

    /// 1-indexed line number of a byte offset.
    #[must_use]
    pub fn line_of(&self, offset: usize) -> usize {
        self.lines.position(self.content, offset).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let content = "line1\nline2\nline3";
        let index = LineIndex::new(content);

        assert_eq!(index.position(content, 0), (1, 1));
        assert_eq!(index.position(content, 6), (2, 1));
        assert_eq!(index.position(content, 8), (2, 3));
        assert_eq!(index.position(content, 17), (3, 6));
    }

    #[test]
    fn test_position_counts_characters() {
        let content = "é = \"x\"";
        let index = LineIndex::new(content);
        // 'é' is two bytes but one column.
        assert_eq!(index.position(content, 5), (1, 5));
    }

    #[test]
    fn test_offset_round_trip() {
        let content = "fn main() {\n    println!(\"ä {}\", 1);\n}\n";
        let index = LineIndex::new(content);

        let offset = index.offset(content, 2, 13);
        assert_eq!(&content[offset..=offset], "\"");
        assert_eq!(index.position(content, offset), (2, 14));
        assert_eq!(index.offset(content, 99, 0), content.len());
    }

    #[test]
    fn test_location_is_relative() {
        let content = "package main\n\nfunc main() { fmt.Println(\"Hi\") }\n";
        let ctx = FileContext::new(
            Path::new("/project/cmd/main.go"),
            content,
            Path::new("/project"),
        );

        let start = content.find("\"Hi\"").unwrap();
        let location = ctx.location(TextRange::new(start, start + 4));
        assert_eq!(location.file, PathBuf::from("cmd/main.go"));
        assert_eq!((location.line, location.column), (3, 27));
        assert_eq!((location.offset, location.length), (start, 4));
    }
}
