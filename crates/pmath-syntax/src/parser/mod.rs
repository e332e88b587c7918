//! # Parser - Precedence Climbing Over a Span Array
//!
//! The parser never builds a tree. It walks the scanned text with a cursor
//! and, every time it reduces a sub-expression, registers a span over the
//! text it covered. The result is the [`SpanArray`] the grouper later turns
//! into boxes.
//!
//! ```text
//! 1+2*3      primary "2", rest "*3"  → span 2..4
//!            primary "1", rest "+…"  → span 0..4
//! ```
//!
//! ## Tokens
//!
//! A full scanning pass marks every token end before parsing starts. The
//! parser then looks at one token at a time through [`Parser::next_token_pos`].
//! A position that already starts a span (a string literal, a comment the
//! parser has seen before) counts as one token covering the whole span.
//!
//! ## Whitespace, Line Breaks and Comments
//!
//! [`Parser::skip_space`] runs after every consumed token. It skips blanks
//! and line continuations, parses block and line comments in place, and
//! decides whether a line break is whitespace:
//!
//! - inside an open fence, or when an operand is required, a line break is
//!   whitespace;
//! - at the top level after a complete operand, it ends the statement.
//!
//! When the text runs out while an operand is still required (or a fence is
//! still open), the parser asks [`ParseHooks::read_line`] for another line,
//! appends it, scans it, and carries on.
//!
//! ## Errors
//!
//! Problems become [`Diagnostic`]s handed to [`ParseHooks::syntax_error`].
//! Only the first critical diagnostic of a statement is reported; the rest
//! are counted but suppressed until a top-level line break starts the next
//! statement. Diagnostics inside comments are informational.
//!
//! ## Module Structure
//!
//! - [`grammar`] - sequences, primaries, operator chains and text lines

mod grammar;

use std::mem;

use crate::error::{Diagnostic, SyntaxErrorKind};
use crate::hooks::ParseHooks;
use crate::scanner::{self, ScanInput, ScanState, scan_next};
use crate::span_array::SpanArray;
use crate::token::{self, TokenClass, chars, is_space};

/// Maximum nesting of grammar calls before the parser gives up on a construct.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Whether diagnostics reach [`ParseHooks::syntax_error`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorMode {
    #[default]
    Report,
    /// Only [`ParseResult::has_critical_error`] is observable.
    Quiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub error_mode: ErrorMode,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            error_mode: ErrorMode::Report,
        }
    }
}

/// Outcome of [`parse`]. The span array always covers the whole text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub spans: SpanArray,
    pub has_critical_error: bool,
    /// [`ParseHooks::should_abort`] stopped the parse early.
    pub aborted: bool,
}

/// Parse `text`, appending any lines pulled from `hooks` to it.
///
/// ```
/// use pmath_syntax::{ParseOptions, parse, to_units};
///
/// let mut text = to_units("1+2*3");
/// let result = parse(&mut text, &mut (), &ParseOptions::default());
/// assert!(!result.has_critical_error);
/// assert_eq!(result.spans.len(), text.len());
/// ```
pub fn parse(text: &mut Vec<u16>, hooks: &mut dyn ParseHooks, options: &ParseOptions) -> ParseResult {
    let parser = Parser::new(mem::take(text), hooks, *options);
    let (full_text, result) = parser.run();
    *text = full_text;
    result
}

/// Scanner input backed by the caller's hooks.
struct ParseInput<'h> {
    hooks: &'h mut dyn ParseHooks,
    /// Lexical diagnostics not yet reached by the parser cursor.
    pending: Vec<Diagnostic>,
    aborted: bool,
}

impl ScanInput for ParseInput<'_> {
    fn more_input(&mut self, state: &mut ScanState) -> bool {
        if self.aborted {
            return false;
        }
        if self.hooks.should_abort() {
            log::debug!("parse aborted while waiting for input");
            self.aborted = true;
            return false;
        }
        match self.hooks.read_line() {
            Some(line) => {
                log::debug!("extending input at {} by {} units", state.len(), line.len() + 1);
                state.append_line(&line);
                true
            }
            None => false,
        }
    }

    fn lexical_error(&mut self, diagnostic: Diagnostic) {
        self.pending.push(diagnostic);
    }
}

/// Parse state threaded through the grammar functions.
pub(crate) struct Parser<'h> {
    scan: ScanState,
    input: ParseInput<'h>,
    pos: usize,
    fence_level: u32,
    depth: usize,
    /// Set when the depth limit is hit; every loop unwinds until the
    /// statement ends.
    stack_error: bool,
    last_was_newline: bool,
    /// Where the most recent whitespace run began. Equal to `pos` when no
    /// whitespace precedes the current token.
    last_space_start: usize,
    /// A critical diagnostic was reported for the current statement.
    have_error: bool,
    critical: bool,
    block_comments: u32,
    line_comments: u32,
    options: ParseOptions,
}

impl<'h> Parser<'h> {
    fn new(text: Vec<u16>, hooks: &'h mut dyn ParseHooks, options: ParseOptions) -> Self {
        Self {
            scan: ScanState::new(text),
            input: ParseInput {
                hooks,
                pending: Vec::new(),
                aborted: false,
            },
            pos: 0,
            fence_level: 0,
            depth: 0,
            stack_error: false,
            last_was_newline: false,
            last_space_start: 0,
            have_error: false,
            critical: false,
            block_comments: 0,
            line_comments: 0,
            options,
        }
    }

    fn run(mut self) -> (Vec<u16>, ParseResult) {
        self.tokenize();
        self.skip_space(None, true);

        while self.pos < self.len() && !self.input.aborted {
            let before = self.pos;
            self.stack_error = false;
            grammar::sequence(&mut self);

            if self.pos < self.len() {
                if self.is_char(self.pos, '\n') {
                    self.flush_pending(self.pos);
                    self.have_error = false;
                    let next = self.next_token_pos();
                    self.skip_to(None, next, true);
                } else {
                    let next = self.next_token_pos();
                    let kind = match self.token_class(next).0 {
                        TokenClass::Right => SyntaxErrorKind::UnmatchedCloseFence,
                        _ => SyntaxErrorKind::UnexpectedToken,
                    };
                    self.error(kind, self.pos);
                }
            }

            if self.pos == before {
                let next = self.next_token_pos();
                self.skip_to(None, next, true);
            }
        }

        self.flush_pending(usize::MAX);
        if self.input.aborted {
            self.critical = true;
            self.report(Diagnostic::critical(SyntaxErrorKind::Aborted, self.len()));
        }

        let critical = self.critical;
        let aborted = self.input.aborted;
        let (text, spans) = self.scan.into_parts();
        let result = ParseResult {
            spans,
            has_critical_error: critical,
            aborted,
        };
        (text, result)
    }

    /// Scan from the scanner cursor to the end of the text.
    fn tokenize(&mut self) {
        while self.scan.pos < self.scan.len() {
            scan_next(&mut self.scan, &mut self.input);
        }
    }

    fn len(&self) -> usize {
        self.scan.len()
    }

    fn unit(&self, pos: usize) -> Option<u16> {
        self.scan.text.get(pos).copied()
    }

    fn is_char(&self, pos: usize, ch: char) -> bool {
        self.unit(pos) == Some(ch as u16)
    }

    fn in_comment(&self) -> bool {
        self.block_comments > 0 || self.line_comments > 0
    }

    /// End (exclusive) of the token at the cursor.
    fn next_token_pos(&self) -> usize {
        if self.pos >= self.len() {
            return self.pos;
        }
        match self.scan.spans.head_at(self.pos) {
            Some(span) => self.scan.spans.end(span) + 1,
            None => self.scan.spans.token_end_after(self.pos),
        }
    }

    /// Class and precedence of the token `pos..next`.
    fn token_class(&self, next: usize) -> (TokenClass, i32) {
        let units = &self.scan.text[self.pos..next];
        let analysed = token::analyse(units);
        if analysed.0 != TokenClass::Name2 || units.first() != Some(&chars::BOX) {
            return analysed;
        }
        match self.input.hooks.embedded_box_text(self.pos) {
            Some(text) => {
                let units: Vec<u16> = text.encode_utf16().collect();
                let classified = token::analyse(&units);
                if classified.0 == TokenClass::None {
                    (TokenClass::Name2, classified.1)
                } else {
                    classified
                }
            }
            None => analysed,
        }
    }

    fn prefix_precedence(&self, next: usize, default: i32) -> i32 {
        token::prefix_precedence(&self.scan.text[self.pos..next], default)
    }

    /// Is the token at the cursor spelled like `last_start..last_end`?
    fn same_token(&self, last_start: usize, last_end: usize, next: usize) -> bool {
        let text = &self.scan.text;
        text.get(last_start..last_end) == text.get(self.pos..next)
    }

    fn mark_operand_start(&mut self, pos: usize) {
        if pos < self.len() {
            self.scan.spans.mark_operand_start(pos);
        }
    }

    fn clear_token_end(&mut self, pos: usize) {
        self.scan.spans.set_token_end(pos, false);
    }

    fn set_token_end(&mut self, pos: usize) {
        self.scan.spans.set_token_end(pos, true);
    }

    /// Register a span from `start` to the cursor.
    fn span(&mut self, start: usize) {
        scanner::close_span(&self.scan.text, &mut self.scan.spans, start, self.pos);
    }

    fn enter(&mut self) -> bool {
        if self.stack_error {
            return false;
        }
        if self.depth >= self.options.max_depth {
            log::debug!("nesting limit {} reached at {}", self.options.max_depth, self.pos);
            self.error(SyntaxErrorKind::RecursionLimit, self.pos);
            self.stack_error = true;
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Report a structural problem at `pos`.
    fn error(&mut self, kind: SyntaxErrorKind, pos: usize) {
        self.flush_pending(pos + 1);
        let diagnostic = if self.in_comment() {
            Diagnostic::informational(kind, pos)
        } else {
            Diagnostic::critical(kind, pos)
        };
        self.handle(diagnostic);
    }

    fn handle(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_critical() {
            self.critical = true;
            if self.have_error {
                log::trace!("suppressing follow-up diagnostic: {diagnostic}");
                return;
            }
            self.have_error = true;
        }
        self.report(diagnostic);
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        if self.options.error_mode == ErrorMode::Report {
            self.input.hooks.syntax_error(&self.scan.text, &diagnostic);
        }
    }

    /// Hand over lexical diagnostics located before `limit`.
    fn flush_pending(&mut self, limit: usize) {
        if self.input.pending.iter().all(|d| d.position >= limit) {
            return;
        }
        let (due, later): (Vec<_>, Vec<_>) = mem::take(&mut self.input.pending)
            .into_iter()
            .partition(|d| d.position < limit);
        self.input.pending = later;
        for diagnostic in due {
            self.handle(diagnostic);
        }
    }

    /// Append one more line of input and scan it.
    fn read_more(&mut self) -> bool {
        if !self.input.more_input(&mut self.scan) {
            return false;
        }
        self.stack_error = false;
        self.tokenize();
        true
    }

    fn skip_to(&mut self, span_start: Option<usize>, next: usize, optional: bool) {
        self.pos = next;
        self.skip_space(span_start, optional);
    }

    /// Skip whitespace, continuations and comments after a token.
    ///
    /// With `optional` unset (an operand is still required) line breaks are
    /// whitespace and running out of text pulls in another line. A script
    /// box directly after the token attaches to the span at `span_start`.
    fn skip_space(&mut self, span_start: Option<usize>, optional: bool) {
        self.last_was_newline = false;

        if self.unit(self.pos) == Some(chars::BOX) && self.input.hooks.is_script_box(self.pos) {
            self.pos += 1;
            if let Some(start) = span_start {
                self.span(start);
            }
        }

        self.last_space_start = self.pos;
        loop {
            while let Some(unit) = self.unit(self.pos)
                && unit != '\n' as u16
                && is_space(unit)
            {
                self.pos += 1;
            }

            if self.pos < self.len() && self.scan.spans.head_at(self.pos).is_some() {
                if self.at_block_comment() || self.at_line_comment() {
                    if let Some(span) = self.scan.spans.innermost_at(self.pos) {
                        self.pos = self.scan.spans.end(span) + 1;
                    }
                    continue;
                }
                break;
            }

            if self.is_char(self.pos, '\n') {
                if (!optional || self.fence_level > 0) && self.line_comments == 0 {
                    self.pos += 1;
                    self.last_was_newline = true;
                    continue;
                }
                break;
            }

            if self.at_continuation() {
                self.pos = self.scan.spans.token_end_after(self.pos);
                continue;
            }

            if self.at_block_comment() {
                self.block_comment();
            } else if self.at_line_comment() {
                self.line_comment();
            } else if self.pos == self.len()
                && (!optional || self.fence_level > 0)
                && self.line_comments == 0
                && !self.input.aborted
            {
                if !self.read_more() {
                    break;
                }
            } else {
                break;
            }
        }

        self.flush_pending(self.pos);
    }

    /// `/*` scanned as one token.
    fn at_block_comment(&self) -> bool {
        self.is_char(self.pos, '/')
            && self.is_char(self.pos + 1, '*')
            && !self.scan.spans.is_token_end(self.pos)
    }

    fn at_line_comment(&self) -> bool {
        self.is_char(self.pos, '%') && self.block_comments == 0
    }

    /// Backslash followed only by blanks up to a line break.
    fn at_continuation(&self) -> bool {
        if !self.is_char(self.pos, '\\') {
            return false;
        }
        let end = self.scan.spans.token_end_after(self.pos);
        end > self.pos + 1
            && self.scan.text[self.pos + 1..end]
                .iter()
                .all(|&u| u == '\n' as u16 || is_space(u))
    }

    /// Parse a `/* … */` comment as statements and span it.
    fn block_comment(&mut self) {
        let start = self.pos;
        let saved_space_start = self.last_space_start;
        let saved_newline = self.last_was_newline;

        if !self.enter() {
            self.skip_comment_body();
            self.span(start);
            return;
        }

        self.block_comments += 1;
        self.fence_level += 1;
        let open_end = self.next_token_pos();
        self.skip_to(None, open_end, false);

        let mut closed = false;
        while self.pos < self.len() {
            let next = self.next_token_pos();
            if self.token_class(next).0 == TokenClass::CommentEnd {
                self.pos = next;
                closed = true;
                break;
            }
            if self.stack_error {
                break;
            }
            let before = self.pos;
            grammar::sequence(self);
            if self.pos == before {
                let next = self.next_token_pos();
                self.skip_to(None, next, false);
            }
        }

        self.fence_level -= 1;
        self.block_comments -= 1;
        if !closed && !self.stack_error {
            self.error(SyntaxErrorKind::UnterminatedComment, start);
        }
        self.span(start);
        self.last_space_start = saved_space_start;
        self.last_was_newline = saved_newline;
        self.leave();
    }

    /// Parse a `%` comment up to the end of its line and span it.
    fn line_comment(&mut self) {
        let start = self.pos;
        let saved_space_start = self.last_space_start;
        let saved_newline = self.last_was_newline;
        if !self.enter() {
            while self.pos < self.len() && !self.is_char(self.pos, '\n') {
                self.pos = self.next_token_pos();
            }
            self.span(start);
            return;
        }
        let saved_fences = mem::replace(&mut self.fence_level, 0);

        self.line_comments += 1;
        let open_end = self.next_token_pos();
        self.skip_to(None, open_end, true);
        while self.pos < self.len() && !self.is_char(self.pos, '\n') && !self.stack_error {
            let before = self.pos;
            grammar::sequence(self);
            if self.pos == before {
                let next = self.next_token_pos();
                self.skip_to(None, next, true);
            }
        }
        self.line_comments -= 1;

        self.fence_level = saved_fences;
        self.span(start);
        self.last_space_start = saved_space_start;
        self.last_was_newline = saved_newline;
        self.leave();
    }

    /// Jump past the `/* … */` comment opening at `pos` without parsing it.
    fn skip_comment_body(&mut self) {
        let mut level = 0usize;
        while self.pos < self.len() {
            let next = self.next_token_pos();
            if next == self.pos {
                return;
            }
            if self.at_block_comment() {
                level += 1;
            } else if self.token_class(next).0 == TokenClass::CommentEnd {
                level = level.saturating_sub(1);
                if level == 0 {
                    self.pos = next;
                    return;
                }
            }
            self.pos = next;
        }
    }

    /// After hitting the depth limit at an open fence: jump past its match.
    fn skip_to_close_fence(&mut self) {
        let mut level = 0usize;
        loop {
            let next = self.next_token_pos();
            if next == self.pos {
                return;
            }
            match self.token_class(next).0 {
                TokenClass::Left | TokenClass::LeftCall => level += 1,
                TokenClass::Right if level <= 1 => {
                    self.skip_to(None, next, true);
                    return;
                }
                TokenClass::Right => level -= 1,
                _ => {}
            }
            self.pos = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;
    use crate::hooks::Recorder;
    use crate::to_units;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse_with(text: &str, hooks: &mut dyn ParseHooks) -> (Vec<u16>, ParseResult) {
        let mut units = to_units(text);
        let result = parse(&mut units, hooks, &ParseOptions::default());
        (units, result)
    }

    fn dump(text: &str) -> String {
        let (units, result) = parse_with(text, &mut ());
        result.spans.dump(&units)
    }

    #[test]
    fn empty_input_is_fine() {
        let (units, result) = parse_with("", &mut ());
        assert!(units.is_empty());
        assert!(result.spans.is_empty());
        assert!(!result.has_critical_error);
    }

    #[test]
    fn product_binds_tighter_than_sum() {
        insta::assert_snapshot!(dump("1+2*3"), @r"
        1+2*3
        +|+|+
        0..4
        2..4
        ");
    }

    #[test]
    fn repeated_operator_shares_one_span() {
        insta::assert_snapshot!(dump("a+b+c"), @r"
        a+b+c
        +|+|+
        0..4
        ");
    }

    #[test]
    fn right_associative_power_nests_to_the_right() {
        insta::assert_snapshot!(dump("a^b^c"), @r"
        a^b^c
        +|+|+
        0..4
        2..4
        ");
    }

    #[test]
    fn call_spans_arguments_and_whole_call() {
        insta::assert_snapshot!(dump("f(x,y)"), @r"
        f(x,y)
        +|+|+|
        0..5
        2..4
        ");
    }

    #[test]
    fn double_brackets_become_single_tokens() {
        insta::assert_snapshot!(dump("a[[1]]"), @r"
        a[[1]]
        +.|+.|
        0..5
        ");
    }

    #[test]
    fn line_break_separates_top_level_statements() {
        insta::assert_snapshot!(dump("1\n+2"), @r"
        1⏎+2
        +|++
        2..3
        ");
    }

    #[rstest]
    #[case("(1+2", SyntaxErrorKind::UnmatchedOpenFence, 0)]
    #[case("1+2)", SyntaxErrorKind::UnmatchedCloseFence, 3)]
    #[case("\"abc", SyntaxErrorKind::UnterminatedString, 0)]
    #[case("1+", SyntaxErrorKind::MissingOperand, 2)]
    #[case("/* a", SyntaxErrorKind::UnterminatedComment, 0)]
    fn each_statement_reports_one_critical_error(
        #[case] text: &str,
        #[case] kind: SyntaxErrorKind,
        #[case] position: usize,
    ) {
        let mut hooks = Recorder::new();
        let (units, result) = parse_with(text, &mut hooks);
        assert!(result.has_critical_error);
        assert_eq!(result.spans.len(), units.len());
        assert_eq!(hooks.diagnostics, [Diagnostic::critical(kind, position)]);
    }

    #[test]
    fn suppression_resets_at_next_statement() {
        let mut hooks = Recorder::new();
        parse_with("(1+\n2)))\n(x", &mut hooks);
        let kinds: Vec<_> = hooks.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [
            SyntaxErrorKind::UnmatchedCloseFence,
            SyntaxErrorKind::UnmatchedOpenFence
        ]);
    }

    #[test]
    fn quiet_mode_only_sets_the_flag() {
        let mut hooks = Recorder::new();
        let mut units = to_units("1+2)");
        let options = ParseOptions {
            error_mode: ErrorMode::Quiet,
            ..ParseOptions::default()
        };
        let result = parse(&mut units, &mut hooks, &options);
        assert!(result.has_critical_error);
        assert!(hooks.diagnostics.is_empty());
    }

    #[test]
    fn open_fence_pulls_more_lines() {
        let mut hooks = Recorder::with_lines(["2,", "3}"]);
        let (units, result) = parse_with("{1,", &mut hooks);
        assert_eq!(String::from_utf16_lossy(&units), "{1,\n2,\n3}");
        assert!(!result.has_critical_error);
        let outer = result.spans.head_at(0).expect("fence span");
        assert_eq!(result.spans.end(outer), units.len() - 1);
    }

    #[test]
    fn complete_statement_does_not_pull_lines() {
        let mut hooks = Recorder::with_lines(["never"]);
        let (units, _) = parse_with("a+b", &mut hooks);
        assert_eq!(units.len(), 3);
        assert_eq!(hooks.lines.len(), 1);
    }

    struct Abort;

    impl ParseHooks for Abort {
        fn read_line(&mut self) -> Option<String> {
            Some("unreachable".into())
        }

        fn should_abort(&self) -> bool {
            true
        }
    }

    #[test]
    fn abort_stops_before_reading() {
        let (units, result) = parse_with("(1+", &mut Abort);
        assert!(result.aborted);
        assert!(result.has_critical_error);
        assert_eq!(result.spans.len(), units.len());
        assert_eq!(units.len(), 3);
    }

    #[test]
    fn errors_inside_comments_are_informational() {
        let mut hooks = Recorder::new();
        let (_, result) = parse_with("a /* (b */", &mut hooks);
        assert!(!result.has_critical_error);
        assert_eq!(hooks.diagnostics.len(), 1);
        assert_eq!(hooks.diagnostics[0].severity, Severity::Informational);
        assert_eq!(hooks.diagnostics[0].kind, SyntaxErrorKind::UnmatchedOpenFence);
    }

    #[test]
    fn block_comment_becomes_one_span() {
        let (units, result) = parse_with("/* x+y */ z", &mut ());
        let comment = result.spans.head_at(0).expect("comment span");
        assert_eq!(result.spans.end(comment), 8);
        assert!(result.spans.head_at(3).is_some());
        assert_eq!(units.len(), 11);
    }

    #[test]
    fn line_comment_stops_at_line_break() {
        let (_, result) = parse_with("a % (b\nc", &mut ());
        assert!(!result.has_critical_error);
        let comment = result.spans.head_at(2).expect("comment span");
        assert_eq!(result.spans.end(comment), 5);
    }

    #[test]
    fn newline_before_juxtaposed_operand_inside_fence_is_a_separator() {
        let mut hooks = Recorder::new();
        let (_, result) = parse_with("(a\nb)", &mut hooks);
        assert!(!result.has_critical_error);
        assert_eq!(
            hooks.diagnostics,
            [Diagnostic::informational(SyntaxErrorKind::NewlineAsSeparator, 3)]
        );
    }

    #[test]
    fn depth_limit_reports_once_and_recovers() {
        let depth = 300;
        let text = format!("{}x{}\ny", "(".repeat(depth), ")".repeat(depth));
        let mut hooks = Recorder::new();
        let (units, result) = parse_with(&text, &mut hooks);
        assert_eq!(result.spans.len(), units.len());
        assert_eq!(hooks.critical_count(), 1);
        assert_eq!(hooks.diagnostics[0].kind, SyntaxErrorKind::RecursionLimit);
        assert!(result.spans.is_operand_start(units.len() - 1));
    }

    #[rstest]
    #[case::block("/*")]
    #[case::line("% ")]
    fn deeply_nested_comments_hit_the_depth_limit(#[case] opener: &str) {
        let mut hooks = Recorder::new();
        let (units, result) = parse_with(&opener.repeat(12_000), &mut hooks);
        assert_eq!(result.spans.len(), units.len());
        assert!(result.spans.is_token_end(units.len() - 1));
        assert!(
            hooks
                .diagnostics
                .iter()
                .any(|d| d.kind == SyntaxErrorKind::RecursionLimit)
        );
    }

    #[test]
    fn comment_past_the_depth_limit_is_still_skipped() {
        let depth = 300;
        let text = format!("{}{}\ny", "/*".repeat(depth), "*/".repeat(depth));
        let mut hooks = Recorder::new();
        let (units, result) = parse_with(&text, &mut hooks);
        assert_eq!(result.spans.len(), units.len());
        assert!(result.spans.is_operand_start(units.len() - 1));
    }

    #[rstest]
    #[case("a+\"b ", 0, 4)]
    #[case("x = \"hi \n", 0, 8)]
    #[case("*\"\n", 0, 2)]
    fn trailing_blanks_never_cut_into_an_unterminated_string(
        #[case] text: &str,
        #[case] start: usize,
        #[case] end: usize,
    ) {
        let (_, result) = parse_with(text, &mut ());
        let outer = result.spans.head_at(start).expect("statement span");
        assert_eq!(result.spans.end(outer), end);
    }

    #[rstest]
    #[case("a++", r#"{"a", "++"}"#)]
    #[case("++a", r#"{"++", "a"}"#)]
    #[case("a++b", r#"{"a", "++", "b"}"#)]
    #[case("a++;b", r#"{{"a", "++"}, ";", "b"}"#)]
    #[case("x/:f[x]:=1", r#"{"x", "/:", {"f", "[", "x", "]"}, ":=", "1"}"#)]
    fn plusplus_and_tagged_assignment_shapes(#[case] text: &str, #[case] expected: &str) {
        let (boxes, has_error) = crate::parse_to_boxes(text);
        assert!(!has_error, "for {text:?}");
        assert_eq!(boxes.to_string(), expected);
    }

    /// Treats every embedded box as a script, or classifies it as `as_text`.
    struct BoxProbe {
        script: bool,
        as_text: Option<&'static str>,
    }

    impl ParseHooks for BoxProbe {
        fn is_script_box(&self, _pos: usize) -> bool {
            self.script
        }

        fn embedded_box_text(&self, _pos: usize) -> Option<String> {
            self.as_text.map(String::from)
        }
    }

    fn with_box(before: &str, after: &str) -> Vec<u16> {
        let mut units = to_units(before);
        units.push(chars::BOX);
        units.extend(to_units(after));
        units
    }

    #[rstest]
    #[case::attached(true, false)]
    #[case::juxtaposed(false, true)]
    fn script_box_attaches_to_the_operand_before_it(#[case] script: bool, #[case] own_span: bool) {
        let mut units = with_box("x", "^2");
        let mut hooks = BoxProbe { script, as_text: None };
        let result = parse(&mut units, &mut hooks, &ParseOptions::default());

        assert!(!result.has_critical_error);
        let ends: Vec<usize> = result.spans.chain_at(0).map(|s| result.spans.end(s)).collect();
        assert_eq!(ends.last(), Some(&if script { 1 } else { 3 }));
        assert_eq!(result.spans.head_at(1).is_some(), own_span);
    }

    #[rstest]
    #[case::operator(Some("+"), true)]
    #[case::operand(None, false)]
    fn embedded_box_text_decides_the_operator(
        #[case] as_text: Option<&'static str>,
        #[case] product_span: bool,
    ) {
        let mut units = with_box("a", "b*c");
        let mut hooks = BoxProbe { script: false, as_text };
        let result = parse(&mut units, &mut hooks, &ParseOptions::default());

        assert!(!result.has_critical_error);
        assert_eq!(result.spans.head_at(2).is_some(), product_span);
    }
}
