//! Source location spans.
//!
//! A span is a byte range inside one file of the include graph. The file is
//! identified by a [`SourceId`] so that problems raised while inlining a
//! definition from an included file still point at the right text.

use std::fmt;

use crate::SourceId;

/// Source location span.
///
/// - source: file of the include graph
/// - start: byte offset from file start
/// - end: byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub source: SourceId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for synthesized nodes.
    pub const DUMMY: Span = Span {
        source: SourceId::ROOT,
        start: 0,
        end: 0,
    };

    /// Create a new span.
    #[inline]
    pub const fn new(source: SourceId, start: u32, end: u32) -> Self {
        Span { source, start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}..{}", self.source.index(), self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", Span::DUMMY), "0:0..0");
        assert_eq!(format!("{:?}", Span::new(SourceId::new(2), 1, 3)), "2:1..3");
    }
}
