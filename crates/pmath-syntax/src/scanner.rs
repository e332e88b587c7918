//! # Scanner - Marking Token Boundaries
//!
//! The scanner walks the text one token at a time and records where each
//! token ends in the [`SpanArray`]. It never produces a token list: the parser
//! later finds tokens by looking for the next token-end flag.
//!
//! ```text
//! text:   x := "a b" + 1.5`10
//! ends:   ^ ^^ ^^ ^^^ ^ ^^^^^^
//! ```
//!
//! ## Dispatch
//!
//! Dispatch is by leading code unit:
//!
//! - ASCII operator glyphs go through a [Logos] table ([`Glyph`]) so the
//!   longest lexeme wins (`//@` over `//` over `/`).
//! - `"` starts a string. String contents are scanned recursively with
//!   [`scan_next`] so escapes and embedded box runs become their own tokens.
//!   A box-open/box-close counter keeps quotes inside box runs from ending
//!   the string early.
//! - `\` starts an escape, or a line continuation when only blanks follow
//!   before the line break.
//! - Names may contain digits, escaped letters (`\[Alpha]`) and
//!   namespace separators (`` a`b ``).
//! - Numbers take an optional radix, fraction, precision, ball radius and
//!   exponent; a malformed tail just ends the number.
//! - `/* */` (nestable) and `%` to end of line are comments. The scanner
//!   only tracks them so it knows where they end; the parser parses
//!   their contents like ordinary statements.
//!
//! ## Streaming
//!
//! When a string or a trailing backslash runs into the end of the text, the
//! scanner asks its [`ScanInput`] for more. Lexical problems are handed to
//! the same input as [`Diagnostic`]s; the scanner itself never fails.
//!
//! [Logos]: https://docs.rs/logos

use logos::Logos;

use crate::charnames;
use crate::error::{Diagnostic, SyntaxErrorKind};
use crate::span_array::SpanArray;
use crate::token::{TokenClass, chars, classify_char, is_base36_digit, is_digit, is_space};

/// ASCII operator lexemes matched by longest match.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    #[token("#")]
    #[token("##")]
    Slot,

    #[token("+")]
    #[token("++")]
    #[token("+=")]
    Plus,

    #[token("-")]
    #[token("--")]
    #[token("-=")]
    #[token("->")]
    Minus,

    #[token("<")]
    #[token("<=")]
    #[token("<<")]
    Less,

    #[token(">")]
    #[token(">=")]
    #[token(">>")]
    Greater,

    #[token("!")]
    #[token("!=")]
    #[token("!!")]
    Bang,

    #[token("=")]
    #[token("==")]
    #[token("===")]
    #[token("=!=")]
    #[token("=>")]
    Equal,

    #[token("~")]
    #[token("~~")]
    #[token("~~~")]
    Tilde,

    #[token(":")]
    #[token("::")]
    #[token("::=")]
    #[token(":=")]
    #[token(":>")]
    Colon,

    #[token("?")]
    #[token("??")]
    Question,

    #[token("|")]
    #[token("||")]
    #[token("|>")]
    #[token("|->")]
    Bar,

    #[token("&")]
    #[token("&&")]
    Amp,

    #[token("/")]
    #[token("/=")]
    #[token("/?")]
    #[token("/@")]
    #[token("/.")]
    #[token("/:")]
    #[token("//")]
    #[token("//@")]
    #[token("//.")]
    #[token("//=")]
    #[token("/\\/")]
    Slash,
}

const GLYPH_WINDOW: usize = 3;

fn is_glyph_start(ch: u16) -> bool {
    matches!(
        char::from_u32(ch as u32),
        Some('#' | '+' | '-' | '<' | '>' | '!' | '=' | '~' | ':' | '?' | '|' | '&' | '/')
    )
}

/// Length of the operator glyph at the start of `units`.
fn glyph_len(units: &[u16]) -> usize {
    let window: String = units
        .iter()
        .take(GLYPH_WINDOW)
        .map_while(|&u| u8::try_from(u).ok().filter(u8::is_ascii).map(char::from))
        .collect();
    let mut lexer = Glyph::lexer(&window);
    match lexer.next() {
        Some(Ok(_)) => lexer.span().len(),
        _ => 1,
    }
}

/// Text plus token flags, and the scanner cursor over them.
///
/// Comment and string state survive between calls so that text appended
/// later continues an open comment correctly.
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    pub text: Vec<u16>,
    pub spans: SpanArray,
    pub pos: usize,
    comment_depth: u32,
    in_string: bool,
    line_comment: bool,
}

impl ScanState {
    pub fn new(text: Vec<u16>) -> Self {
        let spans = SpanArray::new(text.len());
        Self {
            text,
            spans,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Append a line break followed by `line`.
    pub fn append_line(&mut self, line: &str) {
        let before = self.text.len();
        self.text.push('\n' as u16);
        self.text.extend(line.encode_utf16());
        self.spans.grow(self.text.len() - before, 0);
    }

    /// Append raw units without scanning them.
    pub fn push_units(&mut self, units: &[u16]) {
        self.text.extend_from_slice(units);
        self.spans.grow(units.len(), 0);
    }

    /// Scan everything from `start` to the end of the text, starting from
    /// a clean string/comment state.
    pub fn rescan_from(&mut self, start: usize, input: &mut dyn ScanInput) {
        self.pos = start;
        self.comment_depth = 0;
        self.in_string = false;
        self.line_comment = false;
        while self.pos < self.len() {
            scan_next(self, input);
        }
    }

    pub fn into_parts(self) -> (Vec<u16>, SpanArray) {
        (self.text, self.spans)
    }

    fn is(&self, pos: usize, ch: char) -> bool {
        self.text.get(pos) == Some(&(ch as u16))
    }

    fn in_comment(&self) -> bool {
        self.comment_depth > 0 || self.line_comment
    }
}

/// Where the scanner gets more text and sends lexical diagnostics.
pub trait ScanInput {
    /// Extend `state` with another line. Returns `false` when no more input
    /// is available.
    fn more_input(&mut self, state: &mut ScanState) -> bool;

    fn lexical_error(&mut self, diagnostic: Diagnostic);
}

/// Input for scanning a fixed text: never grows, ignores diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl ScanInput for Detached {
    fn more_input(&mut self, _state: &mut ScanState) -> bool {
        false
    }

    fn lexical_error(&mut self, _diagnostic: Diagnostic) {}
}

fn report(state: &ScanState, input: &mut dyn ScanInput, kind: SyntaxErrorKind, pos: usize) {
    let diagnostic = if state.in_comment() {
        Diagnostic::informational(kind, pos)
    } else {
        Diagnostic::critical(kind, pos)
    };
    input.lexical_error(diagnostic);
}

/// Register `[start, end]` if it holds more than one token.
pub(crate) fn register_if_multiple(spans: &mut SpanArray, start: usize, end: usize) {
    if (start..end).any(|pos| spans.is_token_end(pos)) {
        spans.register_span(start, end);
    }
}

/// Span `start..pos`, ignoring trailing blanks.
pub(crate) fn close_span(text: &[u16], spans: &mut SpanArray, start: usize, pos: usize) {
    let Some(mut end) = pos.checked_sub(1) else {
        return;
    };
    if end < start {
        return;
    }
    while end > start && (is_space(text[end]) || text[end] == '\n' as u16) {
        end -= 1;
    }
    let trimmed = end + 1 < pos;
    while end + 1 < pos && !spans.is_token_end(end) {
        end += 1;
    }
    if trimmed {
        // An unterminated string may run on into the trimmed blanks.
        let mut inner = start + 1;
        while inner <= end {
            if let Some(head) = spans.head_at(inner) {
                end = end.max(spans.end(head));
            }
            inner += 1;
        }
    }
    register_if_multiple(spans, start, end);
}

/// Advance past exactly one token and mark its last unit as a token end.
pub fn scan_next(state: &mut ScanState, input: &mut dyn ScanInput) {
    let Some(&ch) = state.text.get(state.pos) else {
        return;
    };
    let start = state.pos;

    match char::from_u32(ch as u32).unwrap_or(char::REPLACEMENT_CHARACTER) {
        '"' if !state.in_string && !state.line_comment => scan_string(state, input),
        '"' => state.pos += 1,
        '\\' => scan_backslash(state, input),
        '*' => scan_stars(state),
        '/' if state.is(start + 1, '*') && !state.in_string && !state.line_comment => {
            state.comment_depth += 1;
            state.pos += 2;
        }
        run @ ('.' | '@' | '%') => {
            state.pos += 1;
            while state.is(state.pos, run) {
                state.pos += 1;
            }
            if run == '%' && !state.in_string && state.comment_depth == 0 {
                state.line_comment = true;
            }
        }
        '`' => {
            state.pos += 1;
            while state.text.get(state.pos).is_some_and(|&u| is_digit(u)) {
                state.pos += 1;
            }
            if state.is(state.pos, '`') {
                state.pos += 1;
            }
        }
        '\n' => {
            state.line_comment = false;
            state.pos += 1;
        }
        _ if is_glyph_start(ch) => state.pos += glyph_len(&state.text[start..]),
        _ => match classify_char(ch).0 {
            TokenClass::Name => {
                state.pos += 1;
                scan_name_rest(state);
            }
            TokenClass::Digit => scan_number(state),
            _ => state.pos += 1,
        },
    }

    state.spans.set_token_end(state.pos - 1, true);
}

fn scan_string(state: &mut ScanState, input: &mut dyn ScanInput) {
    let start = state.pos;
    state.in_string = true;
    state.pos += 1;

    let mut box_depth: i32 = 0;
    let terminated = loop {
        while state.pos < state.len() && (box_depth > 0 || !state.is(state.pos, '"')) {
            let unit = state.text[state.pos];
            let opens = unit == chars::LEFT_BOX || (unit == '\\' as u16 && state.is(state.pos + 1, '('));
            let closes =
                unit == chars::RIGHT_BOX || (unit == '\\' as u16 && state.is(state.pos + 1, ')'));
            if opens || closes {
                box_depth += if opens { 1 } else { -1 };
                state.pos += if unit == '\\' as u16 { 2 } else { 1 };
                state.spans.set_token_end(state.pos - 1, true);
            } else {
                scan_next(state, input);
            }
        }
        if state.pos < state.len() {
            break true;
        }
        if !input.more_input(state) {
            break false;
        }
    };

    if terminated {
        scan_next(state, input);
    } else {
        report(state, input, SyntaxErrorKind::UnterminatedString, start);
    }
    state.in_string = false;

    state.spans.set_token_end(start, true);
    state.spans.mark_operand_start(start);
    register_if_multiple(&mut state.spans, start, state.pos - 1);
}

/// Length of an escape at `pos` that spells a letter, if any.
fn escaped_letter_len(state: &ScanState, pos: usize) -> Option<usize> {
    let (ch, used) = charnames::decode_escape(&state.text[pos..])?;
    let is_letter = match u16::try_from(ch) {
        Ok(unit) => classify_char(unit).0 == TokenClass::Name,
        Err(_) => char::from_u32(ch).is_some_and(char::is_alphanumeric),
    };
    is_letter.then_some(used)
}

fn scan_backslash(state: &mut ScanState, input: &mut dyn ScanInput) {
    let start = state.pos;

    if !state.line_comment {
        let mut blank = start + 1;
        while blank < state.len() && is_space(state.text[blank]) {
            blank += 1;
        }
        if blank == state.len() {
            log::trace!("backslash at end of input, asking for another line");
            if !input.more_input(state) {
                state.pos += 1;
                return;
            }
        }
        if state.is(blank, '\n') {
            state.pos = blank + 1;
            return;
        }
    }

    if let Some(used) = escaped_letter_len(state, start) {
        state.pos += used;
        scan_name_rest(state);
        return;
    }
    if let Some((_, used)) = charnames::decode_escape(&state.text[start..]) {
        state.pos += used;
        return;
    }

    let kind = state.text.get(start + 1).copied().and_then(|u| char::from_u32(u as u32));
    if matches!(kind, Some('x' | 'u' | 'U' | '[')) {
        report(state, input, SyntaxErrorKind::InvalidEscape, start);
    }
    state.pos += 1;
}

fn scan_stars(state: &mut ScanState) {
    state.pos += 1;
    if state.is(state.pos, '=') {
        state.pos += 1;
        return;
    }

    let mut run = 1;
    while run < 3 && state.is(state.pos, '*') {
        state.pos += 1;
        run += 1;
    }
    if state.comment_depth > 0 && !state.in_string && state.is(state.pos, '/') {
        // `**/` is `*` followed by `*/`
        if run > 1 {
            state.spans.set_token_end(state.pos - 2, true);
        }
        state.pos += 1;
        state.comment_depth -= 1;
    }
}

fn scan_name_rest(state: &mut ScanState) {
    let backtick = '`' as u16;
    while let Some(&unit) = state.text.get(state.pos) {
        let class = classify_char(unit).0;
        if unit == backtick {
            let Some(&after) = state.text.get(state.pos + 1) else {
                break;
            };
            if after != backtick && classify_char(after).0 == TokenClass::Name {
                state.pos += 2;
            } else if let Some(used) = (after == '\\' as u16)
                .then(|| escaped_letter_len(state, state.pos + 1))
                .flatten()
            {
                state.pos += 1 + used;
            } else {
                break;
            }
        } else if class == TokenClass::Name || class == TokenClass::Digit {
            state.pos += 1;
        } else if let Some(used) = (unit == '\\' as u16)
            .then(|| escaped_letter_len(state, state.pos))
            .flatten()
        {
            state.pos += used;
        } else {
            break;
        }
    }
}

fn skip_digits(state: &mut ScanState, pred: fn(u16) -> bool) {
    while state.text.get(state.pos).is_some_and(|&u| pred(u)) {
        state.pos += 1;
    }
}

fn digit_at(state: &ScanState, pos: usize) -> bool {
    state.text.get(pos).is_some_and(|&u| is_digit(u))
}

fn base36_at(state: &ScanState, pos: usize) -> bool {
    state.text.get(pos).is_some_and(|&u| is_base36_digit(u))
}

fn scan_number(state: &mut ScanState) {
    let start = state.pos;
    skip_digits(state, is_digit);

    let radix: Option<u32> = String::from_utf16(&state.text[start..state.pos])
        .ok()
        .and_then(|digits| digits.parse().ok());
    let has_radix = state.is(state.pos, '^')
        && state.is(state.pos + 1, '^')
        && base36_at(state, state.pos + 2)
        && radix.is_some_and(|base| (2..=36).contains(&base));

    if has_radix {
        state.pos += 2;
        skip_digits(state, is_base36_digit);
        if state.is(state.pos, '.') && base36_at(state, state.pos + 1) {
            state.pos += 1;
            skip_digits(state, is_base36_digit);
        }
    } else if state.is(state.pos, '.') && digit_at(state, state.pos + 1) {
        state.pos += 1;
        skip_digits(state, is_digit);
    }

    // precision or accuracy: 1.5`20, 1.5``20, 1.5`
    if state.is(state.pos, '`') {
        state.pos += 1;
        if state.is(state.pos, '`') {
            state.pos += 1;
        }
        if (state.is(state.pos, '+') || state.is(state.pos, '-')) && digit_at(state, state.pos + 1) {
            state.pos += 1;
        }
        if digit_at(state, state.pos) {
            skip_digits(state, is_digit);
            if state.is(state.pos, '.') && digit_at(state, state.pos + 1) {
                state.pos += 1;
                skip_digits(state, is_digit);
            }
        }
    }

    // ball radius: 1.5[+/-0.01]
    if let Some(len) = ball_suffix_len(state, state.pos) {
        state.pos += len;
    }

    // exponent: *^-5
    if state.is(state.pos, '*') && state.is(state.pos + 1, '^') {
        let mut exp = state.pos + 2;
        if state.is(exp, '+') || state.is(exp, '-') {
            exp += 1;
        }
        if digit_at(state, exp) {
            state.pos = exp;
            skip_digits(state, is_digit);
        }
    }
}

fn ball_suffix_len(state: &ScanState, pos: usize) -> Option<usize> {
    let prefix = "[+/-";
    if !prefix.chars().enumerate().all(|(i, c)| state.is(pos + i, c)) {
        return None;
    }
    let mut end = pos + prefix.len();
    if !digit_at(state, end) {
        return None;
    }
    while digit_at(state, end) {
        end += 1;
    }
    if state.is(end, '.') && digit_at(state, end + 1) {
        end += 1;
        while digit_at(state, end) {
            end += 1;
        }
    }
    state.is(end, ']').then_some(end + 1 - pos)
}
