//! # Ungrouper - Boxes Back to Text
//!
//! [`flatten`] is the inverse of [`materialize`](crate::group::materialize):
//! it concatenates the text boxes of a tree, puts one sentinel unit where an
//! embedded box sits, rescans each text piece for token boundaries and
//! registers a span over every list that produced more than one token.
//!
//! ```text
//! {"1", "+", {"2", "*", "3"}}   →   "1+2*3"   spans 0..4, 2..4
//! ```
//!
//! ## Box Runs Inside Text
//!
//! A text box may contain `LEFT_BOX … RIGHT_BOX` runs (box syntax written
//! inline). Each run is parsed into a box of its own, handed to the
//! [`FlattenSink`] and replaced by a sentinel.
//!
//! ## Pre-text Directives
//!
//! `{"<<", target}` and `{"??", target}` keep the target as one opaque token
//! instead of rescanning it.

use crate::boxes::{BoxHead, BoxNode};
use crate::group::{GroupOptions, materialize};
use crate::hooks::FlattenSink;
use crate::parser::{ErrorMode, ParseOptions, parse};
use crate::scanner::{Detached, ScanState, register_if_multiple};
use crate::span_array::SpanArray;
use crate::token::chars;

/// Flatten a box tree into text plus the span array describing its groups.
///
/// Embedded boxes (anything that is neither text nor a list) are reported to
/// `sink` together with the position of their sentinel.
pub fn flatten(node: &BoxNode, sink: &mut dyn FlattenSink) -> (Vec<u16>, SpanArray) {
    let mut flattener = Flattener {
        state: ScanState::default(),
        sink,
    };
    flattener.node(node);

    if !flattener.state.is_empty() {
        flattener.state.spans.mark_operand_start(0);
    }
    flattener.state.into_parts()
}

/// Split a string at its `LEFT_BOX … RIGHT_BOX` runs.
///
/// Each run is parsed and materialized; the result is a list of text pieces
/// and run boxes, or a single text box when there are no runs.
pub fn expand_string_boxes(units: &[u16]) -> BoxNode {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut pos = 0;
    while pos < units.len() {
        if units[pos] != chars::LEFT_BOX {
            pos += 1;
            continue;
        }
        let close = matching_close(units, pos);
        if text_start < pos {
            pieces.push(BoxNode::Text(String::from_utf16_lossy(&units[text_start..pos])));
        }
        pieces.push(parse_run(&units[pos + 1..close]));
        pos = (close + 1).min(units.len());
        text_start = pos;
    }
    if text_start < units.len() {
        pieces.push(BoxNode::Text(String::from_utf16_lossy(&units[text_start..])));
    }

    match pieces.len() {
        0 => BoxNode::text(""),
        1 => pieces.remove(0),
        _ => BoxNode::list(pieces),
    }
}

/// Index of the `RIGHT_BOX` closing the run opened at `open`, or the length
/// of `units` when the run is unterminated.
fn matching_close(units: &[u16], open: usize) -> usize {
    let mut depth = 0usize;
    for (pos, &unit) in units.iter().enumerate().skip(open) {
        if unit == chars::LEFT_BOX {
            depth += 1;
        } else if unit == chars::RIGHT_BOX {
            depth -= 1;
            if depth == 0 {
                return pos;
            }
        }
    }
    units.len()
}

fn parse_run(units: &[u16]) -> BoxNode {
    let mut text = units.to_vec();
    let options = ParseOptions {
        error_mode: ErrorMode::Quiet,
        ..ParseOptions::default()
    };
    let result = parse(&mut text, &mut (), &options);
    materialize(&result.spans, &text, &GroupOptions::default(), &mut ())
}

struct Flattener<'s> {
    state: ScanState,
    sink: &'s mut dyn FlattenSink,
}

impl Flattener<'_> {
    fn node(&mut self, node: &BoxNode) {
        match node {
            BoxNode::Located { inner, .. } => self.node(inner),
            BoxNode::Text(text) => self.text(text),
            BoxNode::Compound {
                head: BoxHead::List,
                children,
            } => self.list(children),
            BoxNode::Compound {
                head: BoxHead::String,
                children,
            } => self.string(children),
            BoxNode::Placeholder | BoxNode::Compound { .. } => self.embedded(node),
        }
    }

    fn text(&mut self, text: &str) {
        let units: Vec<u16> = text.encode_utf16().collect();
        let start = self.state.len();

        let mut runs = Vec::new();
        let mut buffer = Vec::with_capacity(units.len());
        let mut pos = 0;
        while pos < units.len() {
            match units[pos] {
                chars::LEFT_BOX => {
                    let close = matching_close(&units, pos);
                    runs.push((start + buffer.len(), parse_run(&units[pos + 1..close])));
                    buffer.push(chars::BOX);
                    pos = close + 1;
                }
                chars::BOX => {
                    buffer.push(chars::NONCHARACTER);
                    pos += 1;
                }
                unit => {
                    buffer.push(unit);
                    pos += 1;
                }
            }
        }

        self.state.push_units(&buffer);
        self.state.rescan_from(start, &mut Detached);
        for (at, node) in &runs {
            self.sink.embedded_box(*at, node);
        }

        if text == "[[" || text == "]]" {
            self.state.spans.set_token_end(start, false);
        }
    }

    fn list(&mut self, children: &[BoxNode]) {
        let start = self.state.len();

        if let [directive, target] = children
            && matches!(directive.as_text(), Some("<<" | "??"))
            && let Some(target) = target.as_text()
            && !target.is_empty()
        {
            self.node(directive);
            let at = self.state.len();
            let units: Vec<u16> = target.encode_utf16().collect();
            self.state.push_units(&units);
            let last = self.state.len() - 1;
            self.state.spans.set_token_end(last, true);
            self.state.spans.mark_operand_start(at);
        } else {
            for child in children {
                self.node(child);
            }
        }

        let end = self.state.len();
        if end > start {
            self.state.spans.mark_operand_start(start);
            register_if_multiple(&mut self.state.spans, start, end - 1);
        }
    }

    /// A string with embedded boxes: text pieces stay raw, boxes become
    /// sentinels, then the whole literal is scanned as one string.
    fn string(&mut self, children: &[BoxNode]) {
        let start = self.state.len();
        let mut boxes = Vec::new();
        for child in children {
            match child.unlocated() {
                BoxNode::Text(text) => {
                    let units: Vec<u16> = text
                        .encode_utf16()
                        .map(|u| if u == chars::BOX { chars::NONCHARACTER } else { u })
                        .collect();
                    self.state.push_units(&units);
                }
                other => {
                    boxes.push((self.state.len(), other));
                    self.state.push_units(&[chars::BOX]);
                }
            }
        }

        self.state.rescan_from(start, &mut Detached);
        for (at, node) in boxes {
            self.sink.embedded_box(at, node);
        }
    }

    fn embedded(&mut self, node: &BoxNode) {
        let at = self.state.len();
        self.state.push_units(&[chars::BOX]);
        self.state.spans.set_token_end(at, true);
        self.state.spans.mark_operand_start(at);
        self.sink.embedded_box(at, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::{EmbeddedBoxes, GroupHooks};
    use crate::{from_units, parse_str, to_units};
    use pretty_assertions::assert_eq;

    fn flat(node: &BoxNode) -> (String, String) {
        let (text, spans) = flatten(node, &mut ());
        (from_units(&text), spans.dump(&text))
    }

    #[test]
    fn nested_lists_become_spans() {
        let node = BoxNode::list(vec![
            "1".into(),
            "+".into(),
            BoxNode::list(vec!["2".into(), "*".into(), "3".into()]),
        ]);
        let (text, dump) = flat(&node);
        assert_eq!(text, "1+2*3");
        insta::assert_snapshot!(dump, @r"
        1+2*3
        +|+||
        0..4
        2..4
        ");
    }

    #[test]
    fn pretext_target_stays_one_token() {
        let node = BoxNode::list(vec!["<<".into(), "dir/file.pmath".into()]);
        let (text, spans) = flatten(&node, &mut ());
        assert_eq!(from_units(&text), "<<dir/file.pmath");
        let ends: Vec<usize> = (0..text.len()).filter(|&p| spans.is_token_end(p)).collect();
        assert_eq!(ends, vec![1, text.len() - 1]);
    }

    #[test]
    fn double_brackets_lose_their_inner_token_end() {
        let node = BoxNode::list(vec![
            "a".into(),
            "[[".into(),
            "1".into(),
            "]]".into(),
        ]);
        let (text, spans) = flatten(&node, &mut ());
        let (parsed_text, parsed) = parse_str("a[[1]]");
        assert_eq!(text, parsed_text);
        for pos in 0..text.len() {
            assert_eq!(spans.is_token_end(pos), parsed.spans.is_token_end(pos), "at {pos}");
        }
    }

    #[test]
    fn embedded_boxes_go_to_the_sink() {
        let frac = BoxNode::named("FractionBox", vec!["1".into(), "2".into()]);
        let node = BoxNode::list(vec!["x".into(), "+".into(), frac.clone()]);
        let mut sink = EmbeddedBoxes::new();
        let (text, spans) = flatten(&node, &mut sink);

        assert_eq!(text, vec!['x' as u16, '+' as u16, chars::BOX]);
        assert!(spans.is_token_end(2));
        assert_eq!(sink.get(2), Some(&frac));
        assert_eq!(sink.box_at(2), frac);
    }

    #[test]
    fn raw_sentinels_in_text_are_neutralised() {
        let text = String::from_utf16_lossy(&[chars::BOX]);
        let (units, _) = flatten(&BoxNode::Text(text), &mut ());
        assert_eq!(units, vec![chars::NONCHARACTER]);
    }

    #[test]
    fn string_box_round_trips_through_the_sink() {
        let frac = BoxNode::named("FractionBox", vec!["1".into(), "2".into()]);
        let node = BoxNode::Compound {
            head: BoxHead::String,
            children: vec!["\"a".into(), frac.clone(), "\"".into()],
        };
        let mut boxes = EmbeddedBoxes::new();
        let (text, spans) = flatten(&node, &mut boxes);
        assert_eq!(spans.head_at(0).map(|s| spans.end(s)), Some(3));

        let back = materialize(&spans, &text, &GroupOptions::default(), &mut boxes);
        assert_eq!(back, node);
    }

    #[test]
    fn box_runs_in_text_become_sentinels() {
        let mut units = to_units("ab");
        units.insert(1, chars::LEFT_BOX);
        units.splice(2..2, to_units("x+y"));
        units.insert(5, chars::RIGHT_BOX);
        let text = String::from_utf16_lossy(&units);

        let mut sink = EmbeddedBoxes::new();
        let (flat, _) = flatten(&BoxNode::Text(text), &mut sink);
        assert_eq!(flat, vec!['a' as u16, chars::BOX, 'b' as u16]);
        assert_eq!(
            sink.get(1).map(ToString::to_string).as_deref(),
            Some(r#"{"x", "+", "y"}"#)
        );
    }

    #[test]
    fn expand_without_runs_is_plain_text() {
        assert_eq!(expand_string_boxes(&to_units("\"abc\"")), BoxNode::text("\"abc\""));
    }

    #[test]
    fn expand_splits_around_runs() {
        let mut units = to_units("\"a");
        units.push(chars::LEFT_BOX);
        units.extend(to_units("1/2"));
        units.push(chars::RIGHT_BOX);
        units.extend(to_units("b\""));
        insta::assert_snapshot!(
            expand_string_boxes(&units).to_string(),
            @r#"{"\"a", {"1", "/", "2"}, "b\""}"#
        );
    }
}
