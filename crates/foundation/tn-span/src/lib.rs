//! Source positions and the table of files taking part in a compilation
//!
//! Every token handed to the binder carries a [`FileSpan`]; diagnostics are
//! reported against it and rendered through a [`FileTable`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A unique identifier for a source file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    /// Creates a file id from its raw index
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// A byte offset span in a source file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset
    pub start: u32,
    /// Exclusive end offset
    pub end: u32,
}

impl Span {
    /// Creates a span covering `start..end`
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Creates an empty span at `offset`
    pub fn point(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    /// Length in bytes
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Smallest span covering both `self` and `other`
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        Self::new(self.start.min(other.start), self.end.max(other.end))
    }
}

/// A span with associated file
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileSpan {
    /// File the span points into
    pub file: FileId,
    /// Offsets inside that file
    pub span: Span,
}

impl FileSpan {
    /// Creates a file span
    pub fn new(file: FileId, span: Span) -> Self {
        Self { file, span }
    }

    /// Empty span at the end of `self`, where a declaration becomes visible
    #[must_use]
    pub fn end_point(self) -> Self {
        Self::new(self.file, Span::point(self.span.end))
    }

    /// Smallest span covering both; `other` must point into the same file
    #[must_use]
    pub fn to(self, other: Self) -> Self {
        debug_assert_eq!(self.file, other.file, "joining spans of different files");
        Self::new(self.file, self.span.to(other.span))
    }
}

impl fmt::Display for FileSpan {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}..{}", self.file, self.span.start, self.span.end)
    }
}

/// Registry mapping source paths to [`FileId`]s
///
/// Registration is idempotent: registering the same path twice yields the
/// same id.
#[derive(Debug, Default, Clone)]
pub struct FileTable {
    paths: Vec<PathBuf>,
    ids: FxHashMap<PathBuf, FileId>,
}

impl FileTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file path and returns its id
    pub fn register(&mut self, path: impl AsRef<Path>) -> FileId {
        let path = path.as_ref().to_path_buf();
        if let Some(&file_id) = self.ids.get(&path) {
            return file_id;
        }

        let file_id = FileId::new(self.paths.len() as u32);
        self.paths.push(path.clone());
        self.ids.insert(path, file_id);
        file_id
    }

    /// Path a file was registered under
    pub fn path(&self, file: FileId) -> Option<&Path> {
        self.paths.get(file.0 as usize).map(PathBuf::as_path)
    }

    /// Final path component of a file, used in diagnostics
    pub fn base_name(&self, file: FileId) -> String {
        self.path(file)
            .and_then(Path::file_name)
            .map_or_else(|| file.to_string(), |name| name.to_string_lossy().into_owned())
    }

    /// Renders a span as `name:start..end`
    pub fn display(&self, span: FileSpan) -> String {
        format!(
            "{}:{}..{}",
            self.base_name(span.file),
            span.span.start,
            span.span.end
        )
    }

    /// Number of registered files
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no file has been registered
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration() {
        let mut files = FileTable::new();
        let first = files.register("pkg/a.go");
        let second = files.register("pkg/a.go");
        assert_eq!(first, second);
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_base_name() {
        let mut files = FileTable::new();
        let file = files.register("src/foo/bar.go");
        assert_eq!(files.base_name(file), "bar.go");
        assert_eq!(files.display(FileSpan::new(file, Span::new(3, 5))), "bar.go:3..5");
        assert_eq!(files.base_name(FileId::new(9)), "#9");
    }

    #[test]
    fn test_span_join() {
        let joined = Span::new(4, 6).to(Span::new(1, 3));
        assert_eq!(joined, Span::new(1, 6));
        let at = FileSpan::new(FileId::new(0), Span::new(2, 8)).end_point();
        assert_eq!(at.span, Span::point(8));
        assert!(at.span.is_empty());
    }
}
