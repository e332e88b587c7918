//! Line/column metadata for produced boxes.
//!
//! [`LocationTagger`] is a [`GroupHooks`] decorator: it wraps every box the
//! grouper produces in [`BoxNode::Located`] without changing the structure.
//! Lines are 1-based, columns are 0-based code-unit offsets.

use crate::boxes::BoxNode;
use crate::group::{GroupOptions, materialize};
use crate::hooks::GroupHooks;
use crate::span_array::SpanArray;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

/// Source range of a box; `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub start: LineColumn,
    pub end: LineColumn,
}

/// Offsets of line starts within a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMap {
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(text: &[u16]) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                text.iter()
                    .enumerate()
                    .filter(|&(_, &u)| u == '\n' as u16)
                    .map(|(i, _)| i + 1),
            )
            .collect();
        Self { line_starts }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_column(&self, pos: usize) -> LineColumn {
        let line = self.line_starts.partition_point(|&start| start <= pos);
        LineColumn {
            line,
            column: pos - self.line_starts[line - 1],
        }
    }

    pub fn location(&self, start: usize, end: usize) -> Location {
        Location {
            start: self.line_column(start),
            end: self.line_column(end),
        }
    }
}

/// Decorates boxes with their [`Location`], delegating lookups to `inner`.
#[derive(Debug, Clone)]
pub struct LocationTagger<H = ()> {
    map: SourceMap,
    inner: H,
}

impl LocationTagger<()> {
    pub fn new(text: &[u16]) -> Self {
        Self::wrap(text, ())
    }
}

impl<H: GroupHooks> LocationTagger<H> {
    pub fn wrap(text: &[u16], inner: H) -> Self {
        Self {
            map: SourceMap::new(text),
            inner,
        }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: GroupHooks> GroupHooks for LocationTagger<H> {
    fn box_at(&mut self, pos: usize) -> BoxNode {
        self.inner.box_at(pos)
    }

    fn decorate(&mut self, node: BoxNode, start: usize, end: usize) -> BoxNode {
        let node = self.inner.decorate(node, start, end);
        BoxNode::Located {
            inner: Box::new(node),
            location: self.map.location(start, end),
        }
    }
}

/// Materialize `text` with every box tagged by its source location.
pub fn tag_locations(spans: &SpanArray, text: &[u16], options: &GroupOptions) -> BoxNode {
    let mut tagger = LocationTagger::new(text);
    materialize(spans, text, options, &mut tagger)
}
