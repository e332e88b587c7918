//! # Span Array - Groupings Over Flat Text
//!
//! The parser does not build a tree. It annotates the source text in place:
//! every code unit gets a small flag set, and every grouping the parser
//! reduces becomes a [`Span`] record whose start is the position that refers
//! to it.
//!
//! ```text
//! text:   1 + 2 * 3
//! pos:    0 1 2 3 4
//! ends:   ^ ^ ^ ^ ^          (every position is a token end here)
//! spans:  [0..4]   at pos 0
//!             [2..4] at pos 2
//! ```
//!
//! ## Chains
//!
//! Several spans may start at the same position. They form a singly linked
//! chain from the head (the most recently registered, widest span) down to
//! the narrowest one:
//!
//! ```text
//! "a+b*c;d"   pos 0:  [0..6] -> [0..4]
//! ```
//!
//! ## Arena Indices
//!
//! Spans live in a growable pool and refer to each other by [`SpanIndex`],
//! never by reference. Growing the array (when the parser pulls in more input
//! lines) therefore never invalidates a chain.
//!
//! ## Invariants
//!
//! - `len()` always equals the length of the text it describes.
//! - Two spans are either disjoint or nested; they never cross.
//! - Spans are append-only; the only mutation is [`SpanArray::extend_span`].

use std::fmt::Write as _;

const TOKEN_END: u8 = 1;
const OPERAND_START: u8 = 2;

/// Stable handle of a span inside a [`SpanArray`] pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanIndex(u32);

/// One grouping `[start, end]`; the start is implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    end: usize,
    next: Option<SpanIndex>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    flags: u8,
    head: Option<SpanIndex>,
}

/// Per-position token flags plus the pool of spans describing the groupings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanArray {
    slots: Vec<Slot>,
    spans: Vec<Span>,
}

impl SpanArray {
    /// Create an array for `length` positions with no flags and no spans.
    #[must_use]
    pub fn new(length: usize) -> Self {
        Self {
            slots: vec![Slot::default(); length],
            spans: Vec::new(),
        }
    }

    /// Append `extra_len` blank positions and reserve room for `extra_spans`.
    pub fn grow(&mut self, extra_len: usize, extra_spans: usize) {
        self.slots.resize(self.slots.len() + extra_len, Slot::default());
        self.spans.reserve(extra_spans);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of spans registered so far.
    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    /// Register `[pos, end]` as the new head of the chain at `pos`.
    ///
    /// Does nothing and returns `None` when the current head already reaches
    /// `end` or further, so repeated reductions at one start are idempotent.
    pub fn register_span(&mut self, pos: usize, end: usize) -> Option<SpanIndex> {
        debug_assert!(pos <= end && end < self.len(), "span {pos}..{end} out of range");
        let head = self.slots[pos].head;
        if let Some(head) = head
            && self.end(head) >= end
        {
            return None;
        }

        let index = SpanIndex(self.spans.len() as u32);
        self.spans.push(Span { end, next: head });
        self.slots[pos].head = Some(index);
        Some(index)
    }

    /// Move the end of an existing span further right.
    ///
    /// Only used when a flattened region turns out to belong to a span that
    /// was already opened at the same start.
    pub fn extend_span(&mut self, span: SpanIndex, end: usize) {
        debug_assert!(end < self.len());
        let record = &mut self.spans[span.0 as usize];
        if record.end < end {
            record.end = end;
        }
    }

    /// Widest span starting at `pos`, if any.
    pub fn head_at(&self, pos: usize) -> Option<SpanIndex> {
        self.slots[pos].head
    }

    /// Next (narrower) span in the chain.
    pub fn next(&self, span: SpanIndex) -> Option<SpanIndex> {
        self.spans[span.0 as usize].next
    }

    /// Inclusive end position of a span.
    pub fn end(&self, span: SpanIndex) -> usize {
        self.spans[span.0 as usize].end
    }

    /// Innermost span of the chain starting at `pos`.
    pub fn innermost_at(&self, pos: usize) -> Option<SpanIndex> {
        let mut span = self.head_at(pos)?;
        while let Some(next) = self.next(span) {
            span = next;
        }
        Some(span)
    }

    /// Iterate the chain at `pos` from widest to narrowest.
    pub fn chain_at(&self, pos: usize) -> impl Iterator<Item = SpanIndex> + '_ {
        std::iter::successors(self.head_at(pos), move |&span| self.next(span))
    }

    pub fn is_token_end(&self, pos: usize) -> bool {
        self.slots[pos].flags & TOKEN_END != 0
    }

    pub fn is_operand_start(&self, pos: usize) -> bool {
        self.slots[pos].flags & OPERAND_START != 0
    }

    pub fn set_token_end(&mut self, pos: usize, value: bool) {
        if value {
            self.slots[pos].flags |= TOKEN_END;
        } else {
            self.slots[pos].flags &= !TOKEN_END;
        }
    }

    pub fn mark_operand_start(&mut self, pos: usize) {
        self.slots[pos].flags |= OPERAND_START;
    }

    /// Position one past the token that starts at `pos`.
    pub fn token_end_after(&self, pos: usize) -> usize {
        let mut next = pos;
        while next < self.len() && !self.is_token_end(next) {
            next += 1;
        }
        (next + 1).min(self.len())
    }

    /// Compact debug rendering: one line of flags and one line per span.
    ///
    /// Flags use `|` for a token end, `^` for an operand start, `+` for both
    /// and `.` for neither.
    pub fn dump(&self, text: &[u16]) -> String {
        let mut out = String::new();
        out.push_str(&String::from_utf16_lossy(text).replace('\n', "⏎"));
        out.push('\n');
        for pos in 0..self.len() {
            out.push(
                match (self.is_token_end(pos), self.is_operand_start(pos)) {
                    (true, true) => '+',
                    (true, false) => '|',
                    (false, true) => '^',
                    (false, false) => '.',
                },
            );
        }
        for pos in 0..self.len() {
            for span in self.chain_at(pos) {
                let _ = write!(out, "\n{pos}..{}", self.end(span));
            }
        }
        out
    }
}
