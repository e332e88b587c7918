//! # Grouper - Span Array to Boxes
//!
//! Turns a parsed text into a [`BoxNode`] tree. Every span becomes a list
//! box holding its pieces; text outside any narrower span becomes one text
//! box per token.
//!
//! ```text
//! "1+2*3"   spans 0..4, 2..4   →   {"1", "+", {"2", "*", "3"}}
//! ```
//!
//! ## Chains
//!
//! The chain at a position runs from the widest span to the narrowest. The
//! narrowest one is materialized first (it is the first piece of every wider
//! span), then the remaining siblings up to the wider span's end follow. A
//! grouping that ends up with a single piece degrades to that piece.
//!
//! ## Strings
//!
//! A string literal is one text box, unless it contains embedded box
//! sentinels: then it becomes a [`BoxHead::String`] compound of the text
//! pieces and the resolved boxes.
//!
//! ## Whitespace
//!
//! With [`GroupOptions::parseable`] set, blanks, line continuations and
//! comments are dropped. Line breaks are kept since they separate
//! statements. Without it every token (spaces included) is kept verbatim.

use crate::boxes::{BoxHead, BoxNode};
use crate::hooks::GroupHooks;
use crate::span_array::{SpanArray, SpanIndex};
use crate::token::{chars, is_space};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupOptions {
    /// Drop whitespace and comments so the boxes can be parsed back.
    pub parseable: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self { parseable: true }
    }
}

/// Build the box tree for `text` from its span array.
///
/// A span array that does not belong to `text` (different length) yields an
/// empty text box.
pub fn materialize(
    spans: &SpanArray,
    text: &[u16],
    options: &GroupOptions,
    hooks: &mut dyn GroupHooks,
) -> BoxNode {
    if spans.len() != text.len() {
        log::debug!(
            "span array of length {} does not match text of length {}",
            spans.len(),
            text.len()
        );
        return BoxNode::text("");
    }

    let mut grouper = Grouper {
        spans,
        text,
        options: *options,
        hooks,
        pos: 0,
    };
    grouper.skip_whitespace();

    let mut items = Vec::new();
    while grouper.pos < text.len() {
        let head = spans.head_at(grouper.pos);
        items.push(grouper.emit(head));
    }

    if items.len() == 1 {
        items.remove(0)
    } else {
        grouper.hooks.decorate(BoxNode::list(items), 0, text.len())
    }
}

struct Grouper<'a> {
    spans: &'a SpanArray,
    text: &'a [u16],
    options: GroupOptions,
    hooks: &'a mut dyn GroupHooks,
    pos: usize,
}

impl Grouper<'_> {
    fn emit(&mut self, span: Option<SpanIndex>) -> BoxNode {
        let Some(span) = span else {
            return self.atom();
        };

        let start = self.pos;
        let end = self.spans.end(span);
        let next = self.spans.next(span);
        if next.is_none() && self.text[start] == '"' as u16 {
            return self.string(end);
        }

        let mut items = vec![self.emit(next)];
        while self.pos <= end && self.pos < self.text.len() {
            let head = self.spans.head_at(self.pos);
            items.push(self.emit(head));
        }

        if items.len() == 1 {
            items.remove(0)
        } else {
            self.hooks.decorate(BoxNode::list(items), start, end + 1)
        }
    }

    /// One token, or the embedded box behind a sentinel.
    fn atom(&mut self) -> BoxNode {
        let start = self.pos;
        let node = if self.text[start] == chars::BOX {
            self.pos += 1;
            self.hooks.box_at(start)
        } else {
            self.pos = self.spans.token_end_after(start);
            BoxNode::Text(String::from_utf16_lossy(&self.text[start..self.pos]))
        };
        let node = self.hooks.decorate(node, start, self.pos);
        self.skip_whitespace();
        node
    }

    /// A string literal spanning `pos..=end`.
    fn string(&mut self, end: usize) -> BoxNode {
        let start = self.pos;
        let literal = &self.text[start..=end];
        self.pos = end + 1;

        let node = if literal.contains(&chars::BOX) {
            let mut children = Vec::new();
            let mut piece = start;
            for at in start..=end {
                if self.text[at] != chars::BOX {
                    continue;
                }
                if piece < at {
                    children.push(BoxNode::Text(String::from_utf16_lossy(&self.text[piece..at])));
                }
                children.push(self.hooks.box_at(at));
                piece = at + 1;
            }
            if piece <= end {
                children.push(BoxNode::Text(String::from_utf16_lossy(&self.text[piece..=end])));
            }
            BoxNode::Compound {
                head: BoxHead::String,
                children,
            }
        } else {
            BoxNode::Text(String::from_utf16_lossy(literal))
        };

        let node = self.hooks.decorate(node, start, end + 1);
        self.skip_whitespace();
        node
    }

    fn skip_whitespace(&mut self) {
        if !self.options.parseable {
            return;
        }
        while let Some(&unit) = self.text.get(self.pos) {
            if is_space(unit) {
                self.pos += 1;
            } else if self.at_continuation() || self.at_comment() {
                self.pos = match self.spans.innermost_at(self.pos) {
                    Some(span) if !self.at_continuation() => self.spans.end(span) + 1,
                    _ => self.spans.token_end_after(self.pos),
                };
            } else {
                break;
            }
        }
    }

    fn at_comment(&self) -> bool {
        let at = |offset: usize, ch: char| self.text.get(self.pos + offset) == Some(&(ch as u16));
        (at(0, '/') && at(1, '*') && !self.spans.is_token_end(self.pos)) || at(0, '%')
    }

    fn at_continuation(&self) -> bool {
        if self.text[self.pos] != '\\' as u16 {
            return false;
        }
        let end = self.spans.token_end_after(self.pos);
        end > self.pos + 1
            && self.text[self.pos + 1..end]
                .iter()
                .all(|&u| u == '\n' as u16 || is_space(u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{EmbeddedBoxes, FlattenSink};
    use crate::{ParseOptions, parse, parse_str, to_units};
    use pretty_assertions::assert_eq;

    fn boxes(text: &str) -> String {
        let (units, result) = parse_str(text);
        materialize(&result.spans, &units, &GroupOptions::default(), &mut ()).to_string()
    }

    #[test]
    fn product_nests_inside_sum() {
        insta::assert_snapshot!(boxes("1+2*3"), @r#"{"1", "+", {"2", "*", "3"}}"#);
    }

    #[test]
    fn juxtaposition_groups_operands() {
        insta::assert_snapshot!(boxes("2 x"), @r#"{"2", "x"}"#);
    }

    #[test]
    fn list_keeps_fences_around_elements() {
        insta::assert_snapshot!(boxes("{1,2,3}"), @r#"{"{", {"1", ",", "2", ",", "3"}, "}"}"#);
    }

    #[test]
    fn call_fence_attaches_to_callee() {
        insta::assert_snapshot!(boxes("f(x,y)"), @r#"{"f", "(", {"x", ",", "y"}, ")"}"#);
    }

    #[test]
    fn single_token_degrades_to_text() {
        assert_eq!(boxes("abc"), r#""abc""#);
    }

    #[test]
    fn statements_stay_separated_by_line_breaks() {
        insta::assert_snapshot!(boxes("a\nb+c"), @r#"{"a", "\n", {"b", "+", "c"}}"#);
    }

    #[test]
    fn comments_are_dropped_when_parseable() {
        insta::assert_snapshot!(boxes("a /* c */ + b"), @r#"{"a", "+", "b"}"#);
    }

    #[test]
    fn whitespace_survives_when_not_parseable() {
        let (units, result) = parse_str("a + b");
        let options = GroupOptions { parseable: false };
        let node = materialize(&result.spans, &units, &options, &mut ());
        insta::assert_snapshot!(node.to_string(), @r#"{"a", " ", "+", " ", "b"}"#);
    }

    #[test]
    fn string_with_sentinel_becomes_string_box() {
        let mut units = to_units("\"a");
        units.push(chars::BOX);
        units.push('"' as u16);
        let result = parse(&mut units, &mut (), &ParseOptions::default());

        let mut lookup = EmbeddedBoxes::new();
        lookup.embedded_box(2, &BoxNode::named("FractionBox", vec!["1".into(), "2".into()]));
        let node = materialize(&result.spans, &units, &GroupOptions::default(), &mut lookup);
        insta::assert_snapshot!(node.to_string(), @r#"String("\"a", FractionBox("1", "2"), "\"")"#);
    }

    #[test]
    fn mismatched_lengths_give_empty_text() {
        let (_, result) = parse_str("a+b");
        let node = materialize(&result.spans, &to_units("a+"), &GroupOptions::default(), &mut ());
        assert_eq!(node, BoxNode::text(""));
    }

    #[test]
    fn materializing_twice_is_stable() {
        let (units, result) = parse_str("f[x, y:z] := {x + y, x y}; g");
        let options = GroupOptions::default();
        let first = materialize(&result.spans, &units, &options, &mut ());
        let second = materialize(&result.spans, &units, &options, &mut ());
        assert_eq!(first, second);
    }
}
