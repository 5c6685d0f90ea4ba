//! Source positions.
//!
//! A [`FileSet`] assigns every added file a disjoint range of *global* offsets (its `base` up to
//! `base + len`). Spans produced by the lexer are global, so a single `usize` identifies both the
//! file and the byte within it, and [`FileSet::position`] turns it back into `file:line:column`.
//!
//! ## Notes
//! - Bases start at `1` and leave a one-byte gap between files, so offset `0` never belongs to a file and the end
//!   offset of one file is never the base of the next.
//! - Lines and columns are 1-based; columns count bytes.

use std::fmt;

/// Line start table for one source text, in global offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    base: usize,
    len: usize,
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str, base: usize) -> Self {
        let mut starts = vec![base];
        starts.extend(source.match_indices('\n').map(|(i, _)| base + i + 1));
        Self {
            base,
            len: source.len(),
            starts,
        }
    }

    /// 1-based line containing `offset` (clamped to the text).
    pub fn line(&self, offset: usize) -> usize {
        let offset = offset.clamp(self.base, self.base + self.len);
        self.starts.partition_point(|&s| s <= offset)
    }

    /// 1-based `(line, column)` of `offset`.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self.line(offset);
        let start = self.starts[line - 1];
        (line, offset.clamp(self.base, self.base + self.len) - start + 1)
    }

    /// Global offset of the first byte of `line` (1-based).
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1).and_then(|i| self.starts.get(i).copied())
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.base && offset <= self.base + self.len
    }
}

/// Human-readable source position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub filename: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// One file registered in a [`FileSet`].
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub base: usize,
    pub source: String,
    pub lines: LineIndex,
}

/// Registry of source files sharing one global offset space.
#[derive(Debug, Clone)]
pub struct FileSet {
    files: Vec<SourceFile>,
    next_base: usize,
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSet {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            next_base: 1,
        }
    }

    /// Register `source` under `name` and return its base offset.
    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        let source = source.into();
        let base = self.next_base;
        self.next_base = base + source.len() + 1;
        self.files.push(SourceFile {
            name: name.into(),
            base,
            lines: LineIndex::new(&source, base),
            source,
        });
        base
    }

    /// File owning a global offset.
    pub fn file(&self, offset: usize) -> Option<&SourceFile> {
        let idx = self.files.partition_point(|f| f.base <= offset);
        let file = self.files.get(idx.checked_sub(1)?)?;
        file.lines.contains(offset).then_some(file)
    }

    /// Resolve a global offset to `file:line:column`.
    pub fn position(&self, offset: usize) -> Option<Position> {
        let file = self.file(offset)?;
        let (line, column) = file.lines.line_col(offset);
        Some(Position {
            filename: file.name.clone(),
            line,
            column,
        })
    }

    /// Source text covered by a span, if it lies within one file.
    pub fn snippet(&self, start: usize, end: usize) -> Option<&str> {
        let file = self.file(start)?;
        file.source.get(start - file.base..end.checked_sub(file.base)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_per_file() {
        let mut fset = FileSet::new();
        let a = fset.add_file("a.gunk", "package a\n\ntype A int\n");
        let b = fset.add_file("b.gunk", "package a\n");
        assert_eq!(a, 1);
        assert!(b > a + 21);

        let pos = fset.position(a + 12).unwrap();
        assert_eq!(pos.to_string(), "a.gunk:3:2");
        let pos = fset.position(b).unwrap();
        assert_eq!(pos.to_string(), "b.gunk:1:1");
        assert!(fset.position(0).is_none());
    }

    #[test]
    fn snippet_extracts_text() {
        let mut fset = FileSet::new();
        let base = fset.add_file("a.gunk", "package foo\n");
        assert_eq!(fset.snippet(base + 8, base + 11), Some("foo"));
    }

    #[test]
    fn line_index_lookup() {
        let index = LineIndex::new("ab\ncd\n", 10);
        assert_eq!(index.line_col(10), (1, 1));
        assert_eq!(index.line_col(13), (2, 1));
        assert_eq!(index.line_col(14), (2, 2));
        assert_eq!(index.line_start(2), Some(13));
    }
}
