//! Collaborators the parser, grouper and ungrouper call back into.
//!
//! Every method has a do-nothing default, so `()` is a valid implementation
//! of each trait and callers only override what they need.

use std::collections::{BTreeMap, VecDeque};

use crate::boxes::BoxNode;
use crate::error::Diagnostic;

/// Callbacks used while parsing.
pub trait ParseHooks {
    /// Next line of input, without its line break, or `None` when exhausted.
    ///
    /// Called when a statement is incomplete at the end of the text (open
    /// fence, unterminated string or comment, trailing backslash).
    fn read_line(&mut self) -> Option<String> {
        None
    }

    /// Is the embedded box at `pos` a sub/superscript box?
    ///
    /// Such boxes attach to the operand in front of them.
    fn is_script_box(&self, _pos: usize) -> bool {
        false
    }

    /// Text an under/overscript box at `pos` should be classified as.
    fn embedded_box_text(&self, _pos: usize) -> Option<String> {
        None
    }

    /// Receive a diagnostic. `text` is the full text parsed so far.
    fn syntax_error(&mut self, _text: &[u16], _diagnostic: &Diagnostic) {}

    /// Checked before blocking on [`read_line`](Self::read_line).
    fn should_abort(&self) -> bool {
        false
    }
}

impl ParseHooks for () {}

/// Parse hooks that feed queued lines and record every diagnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Recorder {
    pub lines: VecDeque<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            diagnostics: Vec::new(),
        }
    }

    pub fn critical_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_critical()).count()
    }
}

impl ParseHooks for Recorder {
    fn read_line(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    fn syntax_error(&mut self, _text: &[u16], diagnostic: &Diagnostic) {
        self.diagnostics.push(*diagnostic);
    }
}

/// Callbacks used while grouping a span array into boxes.
pub trait GroupHooks {
    /// The real box behind the sentinel at `pos`.
    fn box_at(&mut self, _pos: usize) -> BoxNode {
        BoxNode::Placeholder
    }

    /// Wrap a produced box covering `start..end` of the text.
    fn decorate(&mut self, node: BoxNode, _start: usize, _end: usize) -> BoxNode {
        node
    }
}

impl GroupHooks for () {}

/// Receives the embedded boxes found while flattening a box tree.
pub trait FlattenSink {
    /// `node` is represented by the sentinel at `pos` of the flattened text.
    fn embedded_box(&mut self, _pos: usize, _node: &BoxNode) {}
}

impl FlattenSink for () {}

/// Embedded boxes by sentinel position.
///
/// Collects them while flattening and hands them back while grouping, so a
/// flatten/materialize round trip restores the original boxes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedBoxes {
    boxes: BTreeMap<usize, BoxNode>,
}

impl EmbeddedBoxes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: usize) -> Option<&BoxNode> {
        self.boxes.get(&pos)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl FlattenSink for EmbeddedBoxes {
    fn embedded_box(&mut self, pos: usize, node: &BoxNode) {
        self.boxes.insert(pos, node.clone());
    }
}

impl GroupHooks for EmbeddedBoxes {
    fn box_at(&mut self, pos: usize) -> BoxNode {
        self.boxes.get(&pos).cloned().unwrap_or(BoxNode::Placeholder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyntaxErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn recorder_hands_out_lines_in_order() {
        let mut hooks = Recorder::with_lines(["a", "b"]);
        assert_eq!(hooks.read_line().as_deref(), Some("a"));
        assert_eq!(hooks.read_line().as_deref(), Some("b"));
        assert_eq!(hooks.read_line(), None);
    }

    #[test]
    fn recorder_counts_critical_diagnostics() {
        let mut hooks = Recorder::new();
        hooks.syntax_error(&[], &Diagnostic::critical(SyntaxErrorKind::MissingOperand, 0));
        hooks.syntax_error(
            &[],
            &Diagnostic::informational(SyntaxErrorKind::NewlineAsSeparator, 1),
        );
        assert_eq!(hooks.diagnostics.len(), 2);
        assert_eq!(hooks.critical_count(), 1);
    }

    #[test]
    fn embedded_boxes_round_trip_by_position() {
        let mut boxes = EmbeddedBoxes::new();
        let frac = BoxNode::named("FractionBox", vec!["1".into(), "2".into()]);
        boxes.embedded_box(3, &frac);

        assert_eq!(boxes.box_at(3), frac);
        assert_eq!(boxes.box_at(4), BoxNode::Placeholder);
        assert_eq!(boxes.len(), 1);
    }
}
