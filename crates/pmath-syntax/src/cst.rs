//! # Lossless Tree View
//!
//! [`build_tree`] turns a span array into a Rowan tree for editor-style
//! navigation: find the token under a cursor, then walk up through the
//! enclosing spans. The tree text is the parsed text, unit for unit.
//!
//! ```text
//! "f(x)"  →  ROOT
//!              SPAN
//!                NAME "f"  LEFT_FENCE "("  NAME "x"  RIGHT_FENCE ")"
//! ```
//!
//! Spans become `SPAN` nodes, except that a span starting with `"` (and
//! nothing narrower) is a `STRING_LIT` and one starting with `/*` or `%` is a
//! `COMMENT`. Tokens follow the token-end flags; each is classified with
//! [`token::analyse`](crate::token::analyse).

use rowan::GreenNodeBuilder;

use crate::span_array::{SpanArray, SpanIndex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode, SyntaxToken};
use crate::token::{self, TokenClass, chars, is_space};

/// Build the tree for `text`. A span array of a different length yields an
/// empty root.
pub fn build_tree(spans: &SpanArray, text: &[u16]) -> SyntaxNode {
    let mut sink = TreeSink {
        spans,
        text,
        builder: GreenNodeBuilder::new(),
        pos: 0,
    };

    sink.builder.start_node(SyntaxKind::ROOT.into());
    if spans.len() == text.len() {
        while sink.pos < text.len() {
            let head = spans.head_at(sink.pos);
            sink.element(head);
        }
    } else {
        log::debug!("not building a tree over a mismatched span array");
    }
    sink.builder.finish_node();

    SyntaxNode::new_root(sink.builder.finish())
}

/// The token covering the code unit at `pos`.
pub fn token_at(root: &SyntaxNode, pos: usize) -> Option<SyntaxToken> {
    let mut start = 0;
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| {
            let end = start + token.text().encode_utf16().count();
            let found = pos < end;
            start = end;
            found
        })
}

struct TreeSink<'a> {
    spans: &'a SpanArray,
    text: &'a [u16],
    builder: GreenNodeBuilder<'static>,
    pos: usize,
}

impl TreeSink<'_> {
    fn element(&mut self, span: Option<SpanIndex>) {
        let Some(span) = span else {
            self.token();
            return;
        };

        let end = self.spans.end(span);
        let next = self.spans.next(span);
        self.builder.start_node(self.node_kind(next.is_none()).into());
        self.element(next);
        while self.pos <= end && self.pos < self.text.len() {
            let head = self.spans.head_at(self.pos);
            self.element(head);
        }
        self.builder.finish_node();
    }

    fn node_kind(&self, innermost: bool) -> SyntaxKind {
        let at = |offset: usize, ch: char| self.text.get(self.pos + offset) == Some(&(ch as u16));
        if innermost && at(0, '"') {
            SyntaxKind::STRING_LIT
        } else if innermost && ((at(0, '/') && at(1, '*')) || at(0, '%')) {
            SyntaxKind::COMMENT
        } else {
            SyntaxKind::SPAN
        }
    }

    fn token(&mut self) {
        let start = self.pos;
        self.pos = self.spans.token_end_after(start);
        let units = &self.text[start..self.pos];
        self.builder.token(token_kind(units).into(), &String::from_utf16_lossy(units));
    }
}

fn token_kind(units: &[u16]) -> SyntaxKind {
    let is = |index: usize, ch: char| units.get(index) == Some(&(ch as u16));
    if (is(0, '/') && is(1, '*')) || (is(0, '*') && is(1, '/')) || (is(0, '%') && units.len() == 1) {
        return SyntaxKind::COMMENT_DELIMITER;
    }
    if is(0, '\\')
        && units.len() > 1
        && units[1..].iter().all(|&u| u == '\n' as u16 || is_space(u))
    {
        return SyntaxKind::WHITESPACE;
    }

    match token::analyse(units).0 {
        TokenClass::Space => SyntaxKind::WHITESPACE,
        TokenClass::Newline => SyntaxKind::NEWLINE,
        TokenClass::Name | TokenClass::Name2 if units.first() == Some(&chars::BOX) => SyntaxKind::BOX,
        TokenClass::Name | TokenClass::Name2 => SyntaxKind::NAME,
        TokenClass::Digit => SyntaxKind::NUMBER,
        TokenClass::String => SyntaxKind::STRING,
        TokenClass::Left | TokenClass::LeftCall => SyntaxKind::LEFT_FENCE,
        TokenClass::Right => SyntaxKind::RIGHT_FENCE,
        TokenClass::CommentEnd => SyntaxKind::COMMENT_DELIMITER,
        TokenClass::None => SyntaxKind::ERROR,
        _ => SyntaxKind::OPERATOR,
    }
}
