//! Source files of an include graph.
//!
//! The backend never reads files itself. Whoever parsed the input registers
//! each file's text in a [`SourceMap`] and stamps spans with the returned
//! [`SourceId`], which the problem renderer uses to print source excerpts.

use std::fmt;
use std::path::{Path, PathBuf};

/// Index of a file inside a [`SourceMap`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SourceId(u32);

impl SourceId {
    /// The file compilation started from.
    pub const ROOT: SourceId = SourceId(0);

    #[inline]
    pub const fn new(index: u32) -> Self {
        SourceId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.0)
    }
}

/// Zero-based line and column of a byte offset.
///
/// The column counts characters, not bytes, so that markers drawn under a
/// line line up with what a terminal shows.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// A file's path and full text.
#[derive(Clone, Debug)]
pub struct SourceFile {
    path: PathBuf,
    text: String,
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        SourceFile {
            path: path.into(),
            text,
            line_starts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Line and column of a byte offset. Offsets past the end clamp to it.
    pub fn position(&self, offset: u32) -> Position {
        let offset = (offset as usize).min(self.text.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        };
        let start = self.line_starts.get(line).copied().unwrap_or(0);
        let column = self
            .text
            .get(start..offset)
            .map_or(offset - start, |prefix| prefix.chars().count());
        Position { line, column }
    }

    /// Text of a zero-based line without its terminator.
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map_or(self.text.len(), |next| next - 1);
        self.text
            .get(start..end)
            .map(|text| text.trim_end_matches('\r'))
    }
}

/// All files of one compilation, indexed by [`SourceId`].
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        SourceMap::default()
    }

    /// Register a file. The first file added is [`SourceId::ROOT`].
    pub fn add(&mut self, file: SourceFile) -> SourceId {
        let index = u32::try_from(self.files.len()).unwrap_or(u32::MAX);
        self.files.push(file);
        SourceId(index)
    }

    pub fn get(&self, id: SourceId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
